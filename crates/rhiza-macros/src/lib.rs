// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This crate provides procedural macros for the Rhiza container.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitInt, LitStr, Token};

/// A derive macro that turns a struct into a container-managed service.
///
/// Generates the `rhiza_core::Construct` and `rhiza_core::Injectable`
/// impls from the struct's `#[inject]` fields, and (unless `no_scan` is
/// set) submits a registration entry the scanner picks up.
///
/// Type-level options, via `#[injectable(...)]`:
///
/// - `singleton` / `scoped` / `transient` — lifetime policy (default
///   `transient`)
/// - `name = "..."` — index the binding under a string identifier
/// - `provides(dyn TraitA, dyn TraitB)` — also register under these
///   trait-object service identities
/// - `contexts("Menu", "Arena")` / `indices(0, 2)` — context constraint
/// - `dispose` — the type implements `rhiza_core::Dispose`; context
///   teardown fires the hook
/// - `host_managed` — construction is delegated to the component host;
///   cannot be combined with `provides` or `dispose`
/// - `no_scan` — generate the trait impls only, no scanner entry
///
/// Field-level markers: `#[inject]` on an `Arc<T>`, `Arc<dyn S>`,
/// `Option<Arc<T>>`, or `Option<Arc<dyn S>>` field, optionally
/// `#[inject(name = "...")]` to resolve by identifier instead of by type.
/// `Option` fields receive `None` when a context constraint gates the
/// dependency; unmarked fields are filled from `Default`.
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

enum LifetimeOpt {
    Singleton,
    Scoped,
    Transient,
}

struct TypeOptions {
    lifetime: LifetimeOpt,
    identifier: Option<String>,
    provides: Vec<syn::Type>,
    contexts: Vec<String>,
    indices: Vec<usize>,
    dispose: bool,
    host_managed: bool,
    no_scan: bool,
}

struct InjectPoint {
    inner: syn::Type,
    optional: bool,
    name: Option<String>,
}

struct FieldPlan {
    ident: syn::Ident,
    injected: Option<InjectPoint>,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let options = parse_type_options(input)?;
    let fields = collect_fields(input)?;
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let has_injected = fields.iter().any(|field| field.injected.is_some());
    let registry_param = if has_injected {
        quote!(registry)
    } else {
        quote!(_registry)
    };

    let construct_inits = fields.iter().map(|field| {
        let name = &field.ident;
        match &field.injected {
            Some(point) => {
                let expr = resolve_expr(point);
                quote! { #name: #expr }
            }
            None => quote! { #name: ::core::default::Default::default() },
        }
    });

    let inject_assignments = fields.iter().filter_map(|field| {
        let name = &field.ident;
        field.injected.as_ref().map(|point| {
            let expr = resolve_expr(point);
            quote! { self.#name = #expr; }
        })
    });

    let trait_impls = quote! {
        impl #impl_generics ::rhiza_core::Construct for #ident #ty_generics #where_clause {
            fn construct(#registry_param: &::rhiza_core::Registry) -> ::rhiza_core::DiResult<Self> {
                Ok(Self { #(#construct_inits,)* })
            }
        }

        impl #impl_generics ::rhiza_core::Injectable for #ident #ty_generics #where_clause {
            fn inject(&mut self, #registry_param: &::rhiza_core::Registry) -> ::rhiza_core::DiResult<()> {
                #(#inject_assignments)*
                Ok(())
            }
        }
    };

    if options.no_scan {
        return Ok(trait_impls);
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic types cannot be auto-registered; add `no_scan` and register them manually",
        ));
    }

    let entry = scan_entry(ident, &options);
    Ok(quote! {
        #trait_impls
        #entry
    })
}

fn parse_type_options(input: &DeriveInput) -> syn::Result<TypeOptions> {
    let mut options = TypeOptions {
        lifetime: LifetimeOpt::Transient,
        identifier: None,
        provides: Vec::new(),
        contexts: Vec::new(),
        indices: Vec::new(),
        dispose: false,
        host_managed: false,
        no_scan: false,
    };

    for attr in &input.attrs {
        if !attr.path().is_ident("injectable") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("singleton") {
                options.lifetime = LifetimeOpt::Singleton;
            } else if meta.path.is_ident("scoped") {
                options.lifetime = LifetimeOpt::Scoped;
            } else if meta.path.is_ident("transient") {
                options.lifetime = LifetimeOpt::Transient;
            } else if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                options.identifier = Some(lit.value());
            } else if meta.path.is_ident("provides") {
                let content;
                syn::parenthesized!(content in meta.input);
                let types =
                    content.parse_terminated(<syn::Type as syn::parse::Parse>::parse, Token![,])?;
                options.provides.extend(types);
            } else if meta.path.is_ident("contexts") {
                let content;
                syn::parenthesized!(content in meta.input);
                let names =
                    content.parse_terminated(<LitStr as syn::parse::Parse>::parse, Token![,])?;
                options.contexts.extend(names.iter().map(LitStr::value));
            } else if meta.path.is_ident("indices") {
                let content;
                syn::parenthesized!(content in meta.input);
                let values =
                    content.parse_terminated(<LitInt as syn::parse::Parse>::parse, Token![,])?;
                for value in &values {
                    options.indices.push(value.base10_parse::<usize>()?);
                }
            } else if meta.path.is_ident("dispose") {
                options.dispose = true;
            } else if meta.path.is_ident("host_managed") {
                options.host_managed = true;
            } else if meta.path.is_ident("no_scan") {
                options.no_scan = true;
            } else {
                return Err(meta.error("unrecognized `injectable` option"));
            }
            Ok(())
        })?;
    }

    if options.host_managed && (options.dispose || !options.provides.is_empty()) {
        return Err(syn::Error::new_spanned(
            input,
            "`host_managed` cannot be combined with `dispose` or `provides`; the host owns the component",
        ));
    }
    Ok(options)
}

fn collect_fields(input: &DeriveInput) -> syn::Result<Vec<FieldPlan>> {
    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "`Injectable` can only be derived for structs",
            ))
        }
    };

    let named = match &data.fields {
        Fields::Named(named) => &named.named,
        Fields::Unit => return Ok(Vec::new()),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &data.fields,
                "`Injectable` requires named fields (or a unit struct)",
            ))
        }
    };

    let mut plans = Vec::new();
    for field in named {
        let ident = field
            .ident
            .clone()
            .expect("named fields always have an ident");

        let mut marked = false;
        let mut name = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("inject") {
                continue;
            }
            marked = true;
            if matches!(attr.meta, syn::Meta::List(_)) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        let lit: LitStr = meta.value()?.parse()?;
                        name = Some(lit.value());
                        Ok(())
                    } else {
                        Err(meta.error("unrecognized `inject` option"))
                    }
                })?;
            }
        }

        let injected = if marked {
            Some(classify_injected(&field.ty, name)?)
        } else {
            None
        };
        plans.push(FieldPlan { ident, injected });
    }
    Ok(plans)
}

fn classify_injected(ty: &syn::Type, name: Option<String>) -> syn::Result<InjectPoint> {
    if let Some(inside_option) = generic_inner(ty, "Option") {
        if let Some(inner) = generic_inner(inside_option, "Arc") {
            return Ok(InjectPoint {
                inner: inner.clone(),
                optional: true,
                name,
            });
        }
    } else if let Some(inner) = generic_inner(ty, "Arc") {
        return Ok(InjectPoint {
            inner: inner.clone(),
            optional: false,
            name,
        });
    }
    Err(syn::Error::new_spanned(
        ty,
        "`#[inject]` fields must be `Arc<T>` or `Option<Arc<T>>`",
    ))
}

/// Peels one layer of a single-argument generic like `Arc<...>`, matching
/// on the last path segment so `std::sync::Arc` works too.
fn generic_inner<'a>(ty: &'a syn::Type, wrapper: &str) -> Option<&'a syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn resolve_expr(point: &InjectPoint) -> TokenStream2 {
    let inner = &point.inner;
    let resolved = match &point.name {
        Some(name) => quote! { registry.resolve_named::<#inner>(#name)? },
        None => quote! { registry.resolve::<#inner>()? },
    };
    if point.optional {
        resolved
    } else {
        quote! { ::rhiza_core::__support::require(#resolved)? }
    }
}

fn lifetime_tokens(options: &TypeOptions) -> TokenStream2 {
    match options.lifetime {
        LifetimeOpt::Singleton => quote!(::rhiza_core::Lifetime::Singleton),
        LifetimeOpt::Scoped => quote!(::rhiza_core::Lifetime::Scoped),
        LifetimeOpt::Transient => quote!(::rhiza_core::Lifetime::Transient),
    }
}

fn scan_entry(ident: &syn::Ident, options: &TypeOptions) -> TokenStream2 {
    let type_name = ident.to_string();
    let lifetime = lifetime_tokens(options);

    let named_call = options
        .identifier
        .as_ref()
        .map(|id| quote! { .named(#id) })
        .unwrap_or_default();

    let constraint_call = if options.contexts.is_empty() && options.indices.is_empty() {
        TokenStream2::new()
    } else {
        let names = &options.contexts;
        let indices = options
            .indices
            .iter()
            .map(|value| proc_macro2::Literal::usize_suffixed(*value));
        quote! {
            .constrained(::rhiza_core::ContextConstraint::new(
                &[#(#names),*],
                &[#(#indices),*],
            ))
        }
    };

    let erase = |value: TokenStream2| -> TokenStream2 {
        if options.dispose {
            quote! { ::rhiza_core::ErasedInstance::with_disposer(#value, value) }
        } else {
            quote! { ::rhiza_core::ErasedInstance::new(#value) }
        }
    };

    let mut factories = TokenStream2::new();
    let self_path = if options.host_managed {
        quote! { .host_managed() }
    } else {
        let erased = erase(quote!(value.clone()));
        factories.extend(quote! {
            fn __rhiza_self_factory(
                registry: &::rhiza_core::Registry,
            ) -> ::rhiza_core::DiResult<::rhiza_core::ErasedInstance> {
                let mut value = <#ident as ::rhiza_core::Construct>::construct(registry)?;
                ::rhiza_core::Injectable::inject(&mut value, registry)?;
                let value = ::std::sync::Arc::new(value);
                Ok(#erased)
            }
        });
        quote! { .with_factory(::std::sync::Arc::new(__rhiza_self_factory)) }
    };

    let mut provide_registrations = TokenStream2::new();
    for (index, provided) in options.provides.iter().enumerate() {
        let factory_ident = format_ident!("__rhiza_provides_{}", index);
        let erased = erase(quote!(service));
        factories.extend(quote! {
            fn #factory_ident(
                registry: &::rhiza_core::Registry,
            ) -> ::rhiza_core::DiResult<::rhiza_core::ErasedInstance> {
                let mut value = <#ident as ::rhiza_core::Construct>::construct(registry)?;
                ::rhiza_core::Injectable::inject(&mut value, registry)?;
                let value = ::std::sync::Arc::new(value);
                let service: ::std::sync::Arc<#provided> = value.clone();
                Ok(#erased)
            }
        });
        provide_registrations.extend(quote! {
            registry.register(
                ::rhiza_core::ServiceBinding::new::<#provided>(#lifetime)
                    .implemented_by::<#ident>()
                    #constraint_call
                    .with_factory(::std::sync::Arc::new(#factory_ident)),
            );
        });
    }

    quote! {
        const _: () = {
            #factories

            fn __rhiza_register(registry: &::rhiza_core::Registry) -> ::rhiza_core::DiResult<()> {
                registry.register(
                    ::rhiza_core::ServiceBinding::new::<#ident>(#lifetime)
                        #named_call
                        #constraint_call
                        #self_path,
                );
                #provide_registrations
                Ok(())
            }

            ::rhiza_core::__support::inventory::submit! {
                ::rhiza_core::RegistrationEntry {
                    type_name: #type_name,
                    module: ::core::module_path!(),
                    register: __rhiza_register,
                }
            }
        };
    }
}
