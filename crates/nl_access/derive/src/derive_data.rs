//! Parsed representation of a `#[derive(NodeShape)]` input.

use syn::{Data, DeriveInput, Fields, GenericArgument, Ident, PathArguments, Type};

use crate::NODE_ATTRIBUTE_NAME;

/// Type-level `#[node(...)]` flags.
#[derive(Default)]
pub(crate) struct StructAttrs {
    /// `#[node(graph_node)]`: the shape is a collectable entity.
    pub graph_node: bool,
    /// `#[node(value)]`: the shape has value (copy-out) semantics.
    pub value: bool,
    /// `#[node(default)]`: register `Self::default` as the instantiator.
    pub default: bool,
    /// `#[node(navigable)]`: the type implements `Navigable` itself and
    /// takes over path resolution below it.
    pub navigable: bool,
}

/// Field-level `#[node(...)]` flags.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    /// `#[node(skip)]`: not a member at all.
    pub skip: bool,
    /// `#[node(readonly)]`: readable, never written or mutably traversed.
    pub readonly: bool,
}

/// One addressable member of the derived shape.
pub(crate) struct NodeField {
    pub ident: Ident,
    pub name: String,
    /// The type stored behind the member: for `Option<T>` fields this is
    /// `T`, otherwise the field type itself.
    pub stored_ty: Type,
    pub optional: bool,
    pub readonly: bool,
}

/// A validated `#[derive(NodeShape)]` input: a non-generic struct with
/// named fields.
pub(crate) struct NodeStruct {
    pub ident: Ident,
    pub attrs: StructAttrs,
    pub fields: Vec<NodeField>,
}

impl NodeStruct {
    pub fn parse(input: &DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.generics,
                "`NodeShape` cannot be derived for generic types; implement \
                 `Shaped` and `Node` manually with a `GenericShapeCell`",
            ));
        }

        let Data::Struct(data) = &input.data else {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "`NodeShape` can only be derived for structs",
            ));
        };
        let Fields::Named(named) = &data.fields else {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "`NodeShape` requires named fields",
            ));
        };

        let attrs = parse_struct_attrs(input)?;

        let mut fields = Vec::new();
        for field in &named.named {
            let field_attrs = parse_field_attrs(field)?;
            if field_attrs.skip {
                continue;
            }
            // Unwrap is fine: `Fields::Named` guarantees idents.
            let ident = field.ident.clone().unwrap();
            let (stored_ty, optional) = match option_inner(&field.ty) {
                Some(inner) => (inner.clone(), true),
                None => (field.ty.clone(), false),
            };
            fields.push(NodeField {
                name: ident.to_string(),
                ident,
                stored_ty,
                optional,
                readonly: field_attrs.readonly,
            });
        }

        Ok(Self {
            ident: input.ident.clone(),
            attrs,
            fields,
        })
    }
}

fn parse_struct_attrs(input: &DeriveInput) -> syn::Result<StructAttrs> {
    let mut attrs = StructAttrs::default();
    for attr in &input.attrs {
        if !attr.path().is_ident(NODE_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("graph_node") {
                attrs.graph_node = true;
            } else if meta.path.is_ident("value") {
                attrs.value = true;
            } else if meta.path.is_ident("default") {
                attrs.default = true;
            } else if meta.path.is_ident("navigable") {
                attrs.navigable = true;
            } else {
                return Err(meta.error(
                    "expected one of `graph_node`, `value`, `default`, `navigable`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident(NODE_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("readonly") {
                attrs.readonly = true;
            } else {
                return Err(meta.error("expected one of `skip`, `readonly`"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

/// Returns the `T` of an `Option<T>` field type.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first() {
        Some(GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}
