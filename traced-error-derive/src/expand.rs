use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, format_ident, quote};
use std::collections::{BTreeMap, BTreeSet};
use syn::visit::Visit;
use syn::{DataEnum, DataStruct, DeriveInput, Fields, Generics, Ident, Member, Result};

use crate::attr::FieldInfo;

pub fn derive(input: DeriveInput) -> Result<TokenStream> {
    let ident = input.ident;
    let generics = input.generics;

    match input.data {
        syn::Data::Struct(data) => expand_struct(ident, generics, data),
        syn::Data::Enum(data) => expand_enum(ident, generics, data),
        syn::Data::Union(_) => Err(syn::Error::new(
            ident.span(),
            "StackTracer cannot be derived for unions",
        )),
    }
}

fn expand_struct(ident: Ident, generics: Generics, data: DataStruct) -> Result<TokenStream> {
    let style = FieldsStyle::of(&data.fields).ok_or_else(|| {
        syn::Error::new(
            ident.span(),
            "unit structs do not support #[derive(StackTracer)]",
        )
    })?;

    let fields = FieldInfo::from_fields(&data.fields)?;
    let links = Links::resolve(&fields, style.allows_names(), ident.span())?;

    let mut generics = generics;
    let mut bounds = BoundsTracker::new(&generics);
    if let Some(next) = &links.next {
        bounds.collect(&fields[next.index].ty, next.is_end);
    }
    bounds.apply(&mut generics);

    let recorded_body = match links.trace {
        Some(index) => recorded_some(&self_member(&fields[index].member)),
        None => quote! { ::core::option::Option::None },
    };
    let next_body = match &links.next {
        Some(next) => next_some(&self_member(&fields[next.index].member), next.is_end),
        None => quote! { ::core::option::Option::None },
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let into_traced = from_impl(&ident, &generics);

    Ok(quote! {
        impl #impl_generics ::traced_error::StackTracer for #ident #ty_generics #where_clause {
            fn recorded(&self) -> ::core::option::Option<&::traced_error::StackTrace> {
                #recorded_body
            }

            fn next<'__traced>(
                &'__traced self,
            ) -> ::core::option::Option<::traced_error::Chain<'__traced>> {
                #next_body
            }
        }

        #into_traced
    })
}

fn expand_enum(ident: Ident, generics: Generics, data: DataEnum) -> Result<TokenStream> {
    let mut variants = Vec::with_capacity(data.variants.len());
    let mut errors: Option<syn::Error> = None;

    for variant in data.variants {
        let Some(style) = FieldsStyle::of(&variant.fields) else {
            errors = combine_error(
                errors,
                syn::Error::new(
                    variant.ident.span(),
                    "unit variants do not support #[derive(StackTracer)]",
                ),
            );
            continue;
        };

        let fields = match FieldInfo::from_fields(&variant.fields) {
            Ok(fields) => fields,
            Err(err) => {
                errors = combine_error(errors, err);
                continue;
            }
        };

        let links = match Links::resolve(&fields, style.allows_names(), variant.ident.span()) {
            Ok(links) => links,
            Err(err) => {
                errors = combine_error(errors, err);
                continue;
            }
        };

        variants.push(VariantInfo {
            ident: variant.ident,
            style,
            fields,
            links,
        });
    }

    if let Some(err) = errors {
        return Err(err);
    }

    let mut generics = generics;
    let mut bounds = BoundsTracker::new(&generics);
    for variant in &variants {
        if let Some(next) = &variant.links.next {
            bounds.collect(&variant.fields[next.index].ty, next.is_end);
        }
    }
    bounds.apply(&mut generics);

    let recorded_arms = variants.iter().map(|variant| {
        let variant_ident = &variant.ident;
        let pattern = variant.pattern(variant.links.trace);
        let body = match variant.links.trace {
            Some(_) => recorded_some(&binding().into_token_stream()),
            None => quote! { ::core::option::Option::None },
        };
        quote! {
            Self::#variant_ident #pattern => #body
        }
    });

    let next_arms = variants.iter().map(|variant| {
        let variant_ident = &variant.ident;
        let pattern = variant.pattern(variant.links.next.as_ref().map(|next| next.index));
        let body = match &variant.links.next {
            Some(next) => next_some(&binding().into_token_stream(), next.is_end),
            None => quote! { ::core::option::Option::None },
        };
        quote! {
            Self::#variant_ident #pattern => #body
        }
    });

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let into_traced = from_impl(&ident, &generics);

    Ok(quote! {
        impl #impl_generics ::traced_error::StackTracer for #ident #ty_generics #where_clause {
            fn recorded(&self) -> ::core::option::Option<&::traced_error::StackTrace> {
                match self {
                    #(#recorded_arms,)*
                }
            }

            fn next<'__traced>(
                &'__traced self,
            ) -> ::core::option::Option<::traced_error::Chain<'__traced>> {
                match self {
                    #(#next_arms,)*
                }
            }
        }

        #into_traced
    })
}

/// `impl From<Type> for TracedError`, keeping the trace the value already holds.
fn from_impl(ident: &Ident, generics: &Generics) -> TokenStream {
    let (_, ty_generics, _) = generics.split_for_impl();
    let ty: syn::Type = syn::parse_quote!(#ident #ty_generics);

    let mut generics = generics.clone();
    generics
        .make_where_clause()
        .predicates
        .push(syn::parse_quote!(#ty: ::core::marker::Send + ::core::marker::Sync + 'static));
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics ::core::convert::From<#ty> for ::traced_error::TracedError
        #where_clause
        {
            #[track_caller]
            fn from(error: #ty) -> Self {
                ::traced_error::StackTracerExt::into_traced(error)
            }
        }
    }
}

/// Name bound to the single field an enum arm looks at.
fn binding() -> Ident {
    format_ident!("__traced_field")
}

fn self_member(member: &Member) -> TokenStream {
    quote! { self.#member }
}

fn recorded_some(place: &TokenStream) -> TokenStream {
    quote! {{
        let trace: &::traced_error::StackTrace = &#place;
        ::core::option::Option::Some(trace)
    }}
}

fn next_some(place: &TokenStream, is_end: bool) -> TokenStream {
    if is_end {
        quote! {{
            use ::traced_error::private::AsDynStdError as _;
            ::core::option::Option::Some(::traced_error::Chain::from_dyn(
                #place.as_dyn_std_error(),
            ))
        }}
    } else {
        quote! {{
            use ::traced_error::private::AsDynStackTracer as _;
            ::core::option::Option::Some(::traced_error::Chain::Traced(
                #place.as_dyn_stack_tracer(),
            ))
        }}
    }
}

#[derive(Clone, Copy)]
enum FieldsStyle {
    Named,
    Unnamed,
}

impl FieldsStyle {
    fn of(fields: &Fields) -> Option<Self> {
        match fields {
            Fields::Named(_) => Some(FieldsStyle::Named),
            Fields::Unnamed(_) => Some(FieldsStyle::Unnamed),
            Fields::Unit => None,
        }
    }

    fn allows_names(self) -> bool {
        matches!(self, FieldsStyle::Named)
    }
}

struct NextInfo {
    index: usize,
    is_end: bool,
}

/// Which fields hold the recorded trace and the next link.
struct Links {
    trace: Option<usize>,
    next: Option<NextInfo>,
}

impl Links {
    fn resolve(fields: &[FieldInfo], allow_name: bool, missing_span: Span) -> Result<Self> {
        let trace = resolve_trace(fields, allow_name)?;
        let next = resolve_next(fields, allow_name)?;

        if let (Some(trace), Some(next)) = (trace, &next)
            && trace == next.index
        {
            return Err(syn::Error::new(
                fields[trace].span,
                "a field cannot be both the stack trace and the next link",
            ));
        }

        if trace.is_none() && next.is_none() {
            return Err(syn::Error::new(
                missing_span,
                "missing #[stack_trace] field, or #[source] / #[traced(end)] field",
            ));
        }

        Ok(Self { trace, next })
    }
}

fn resolve_trace(fields: &[FieldInfo], allow_name: bool) -> Result<Option<usize>> {
    let mut index = None;

    for (idx, field) in fields.iter().enumerate() {
        if field.attrs.is_stack_trace {
            if index.is_some() {
                return Err(syn::Error::new(
                    field.span,
                    "multiple fields marked with #[stack_trace]",
                ));
            }
            index = Some(idx);
        }
    }

    if index.is_some() {
        return Ok(index);
    }

    if allow_name {
        return Ok(fields.iter().position(|field| field.is_named("stack_trace")));
    }

    Ok(None)
}

fn resolve_next(fields: &[FieldInfo], allow_name: bool) -> Result<Option<NextInfo>> {
    let marked: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.attrs.is_source || field.attrs.is_end)
        .map(|(idx, _)| idx)
        .collect();

    if let Some(second) = marked.get(1) {
        return Err(syn::Error::new(
            fields[*second].span,
            "multiple fields marked with #[source] or #[traced(end)]",
        ));
    }

    if let Some(idx) = marked.first().copied() {
        return Ok(Some(NextInfo {
            index: idx,
            is_end: fields[idx].attrs.is_end,
        }));
    }

    if allow_name
        && let Some(idx) = fields.iter().position(|field| field.is_named("source"))
    {
        return Ok(Some(NextInfo {
            index: idx,
            is_end: false,
        }));
    }

    Ok(None)
}

struct VariantInfo {
    ident: Ident,
    style: FieldsStyle,
    fields: Vec<FieldInfo>,
    links: Links,
}

impl VariantInfo {
    /// Pattern binding the field at `index`, if any, to [binding].
    fn pattern(&self, index: Option<usize>) -> TokenStream {
        let binding = binding();
        match self.style {
            FieldsStyle::Named => match index.and_then(|idx| self.fields[idx].ident.as_ref()) {
                Some(field_ident) => quote! { { #field_ident: #binding, .. } },
                None => quote! { { .. } },
            },
            FieldsStyle::Unnamed => {
                let patterns = (0..self.fields.len()).map(|idx| {
                    if Some(idx) == index {
                        quote! { #binding }
                    } else {
                        quote! { _ }
                    }
                });
                quote! { ( #(#patterns),* ) }
            }
        }
    }
}

struct BoundsTracker {
    params: BTreeMap<String, Ident>,
    needs_tracer: BTreeSet<String>,
    needs_error: BTreeSet<String>,
}

impl BoundsTracker {
    fn new(generics: &Generics) -> Self {
        let params = generics
            .type_params()
            .map(|param| (param.ident.to_string(), param.ident.clone()))
            .collect();

        BoundsTracker {
            params,
            needs_tracer: BTreeSet::new(),
            needs_error: BTreeSet::new(),
        }
    }

    fn collect(&mut self, ty: &syn::Type, is_end: bool) {
        let mut visitor = TypeParamCollector {
            params: &self.params,
            found: BTreeSet::new(),
        };
        visitor.visit_type(ty);

        for name in visitor.found {
            if is_end {
                self.needs_error.insert(name);
            } else {
                self.needs_tracer.insert(name);
            }
        }
    }

    fn apply(&self, generics: &mut Generics) {
        for param in generics.type_params_mut() {
            let name = param.ident.to_string();
            if self.needs_tracer.contains(&name) {
                param
                    .bounds
                    .push(syn::parse_quote!(::traced_error::StackTracer));
            }
            if self.needs_error.contains(&name) {
                param.bounds.push(syn::parse_quote!(::core::error::Error));
                param.bounds.push(syn::parse_quote!('static));
            }
        }
    }
}

struct TypeParamCollector<'a> {
    params: &'a BTreeMap<String, Ident>,
    found: BTreeSet<String>,
}

impl<'ast> Visit<'ast> for TypeParamCollector<'_> {
    fn visit_type_path(&mut self, type_path: &'ast syn::TypePath) {
        if type_path.qself.is_none()
            && let Some(segment) = type_path.path.segments.first()
        {
            let name = segment.ident.to_string();
            if self.params.contains_key(&name) {
                self.found.insert(name);
            }
        }

        syn::visit::visit_type_path(self, type_path);
    }
}

fn combine_error(acc: Option<syn::Error>, next: syn::Error) -> Option<syn::Error> {
    match acc {
        Some(mut err) => {
            err.combine(next);
            Some(err)
        }
        None => Some(next),
    }
}
