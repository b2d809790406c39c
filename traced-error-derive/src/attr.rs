use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Field, Ident, Member, Result};

#[derive(Default, Clone)]
pub struct FieldAttrs {
    pub is_source: bool,
    pub is_stack_trace: bool,
    pub is_end: bool,
}

#[derive(Clone)]
pub struct FieldInfo {
    pub member: Member,
    pub ident: Option<Ident>,
    pub ty: syn::Type,
    pub attrs: FieldAttrs,
    pub span: Span,
}

impl FieldInfo {
    pub fn from_fields(fields: &syn::Fields) -> Result<Vec<Self>> {
        fields
            .iter()
            .enumerate()
            .map(|(index, field)| Self::from_syn(index, field))
            .collect()
    }

    fn from_syn(index: usize, field: &Field) -> Result<Self> {
        let attrs = parse_field_attrs(field)?;
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(syn::Index::from(index)),
        };

        Ok(Self {
            member,
            ident: field.ident.clone(),
            ty: field.ty.clone(),
            attrs,
            span: field.span(),
        })
    }

    pub fn is_named(&self, name: &str) -> bool {
        matches!(&self.ident, Some(ident) if ident == name)
    }
}

fn parse_field_attrs(field: &Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();

    for attr in &field.attrs {
        if attr.path().is_ident("source") {
            attr.meta.require_path_only()?;
            if attrs.is_source {
                return Err(syn::Error::new_spanned(
                    attr,
                    "duplicate #[source] attribute",
                ));
            }
            attrs.is_source = true;
            continue;
        }

        if attr.path().is_ident("stack_trace") {
            attr.meta.require_path_only()?;
            if attrs.is_stack_trace {
                return Err(syn::Error::new_spanned(
                    attr,
                    "duplicate #[stack_trace] attribute",
                ));
            }
            attrs.is_stack_trace = true;
            continue;
        }

        if attr.path().is_ident("traced") {
            let parsed = attr.parse_args_with(|input: syn::parse::ParseStream| {
                let ident: Ident = input.parse()?;
                if ident == "end" {
                    Ok(())
                } else {
                    Err(syn::Error::new(ident.span(), "expected `end`"))
                }
            });
            if let Err(err) = parsed {
                return Err(syn::Error::new_spanned(
                    attr,
                    format!("invalid #[traced] attribute: {err}"),
                ));
            }
            if attrs.is_end {
                return Err(syn::Error::new_spanned(
                    attr,
                    "duplicate #[traced(end)] attribute",
                ));
            }
            attrs.is_end = true;
        }
    }

    Ok(attrs)
}
