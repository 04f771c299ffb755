//! Token generation for `#[derive(NodeShape)]`.
//!
//! All emitted paths are fully qualified through `nl_access::` so the
//! expansion is independent of the deriving crate's imports; `nl_access`
//! itself resolves the same paths through its `extern crate self` alias.

use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{NodeField, NodeStruct};

/// Generates the `Shaped` + `Node` + `Object` implementations.
pub(crate) fn impl_node_shape(info: &NodeStruct) -> TokenStream {
    let shaped_tokens = impl_trait_shaped(info);
    let node_tokens = impl_trait_node(info);
    let object_tokens = impl_trait_object(info);

    quote! {
        const _: () = {
            #shaped_tokens

            #node_tokens

            #object_tokens
        };
    }
}

/// Generate `Shaped` implementation tokens.
fn impl_trait_shaped(info: &NodeStruct) -> TokenStream {
    let ident = &info.ident;
    let name = ident.to_string();

    let members = info.fields.iter().map(|field| {
        let member_name = &field.name;
        let stored_ty = &field.stored_ty;
        let constructor = if field.optional {
            quote! { nl_access::info::MemberInfo::optional::<#stored_ty>(#member_name) }
        } else {
            quote! { nl_access::info::MemberInfo::new::<#stored_ty>(#member_name) }
        };
        if field.readonly {
            quote! { #constructor.readonly() }
        } else {
            constructor
        }
    });

    let graph_node = info
        .attrs
        .graph_node
        .then(|| quote! { .with_graph_node() });
    let value = info
        .attrs
        .value
        .then(|| quote! { .with_value_semantics() });
    let default = info
        .attrs
        .default
        .then(|| quote! { .with_default::<Self>() });

    quote! {
        impl nl_access::info::Shaped for #ident {
            fn shape_info() -> &'static nl_access::info::ShapeInfo {
                static CELL: nl_access::impls::ShapeCell = nl_access::impls::ShapeCell::new();
                CELL.get_or_init(|| {
                    nl_access::info::ShapeInfo::object::<Self>(
                        #name,
                        [ #(#members,)* ],
                    )
                    #graph_node
                    #value
                    #default
                })
            }
        }
    }
}

/// Generate `Node` implementation tokens.
fn impl_trait_node(info: &NodeStruct) -> TokenStream {
    let ident = &info.ident;

    let navigable_tokens = info.attrs.navigable.then(|| {
        quote! {
            #[inline]
            fn as_navigable(&self) -> ::core::option::Option<&dyn nl_access::node::Navigable> {
                ::core::option::Option::Some(self)
            }

            #[inline]
            fn as_navigable_mut(
                &mut self,
            ) -> ::core::option::Option<&mut dyn nl_access::node::Navigable> {
                ::core::option::Option::Some(self)
            }
        }
    });

    quote! {
        impl nl_access::node::Node for #ident {
            #[inline]
            fn shape(&self) -> &'static nl_access::info::ShapeInfo {
                <Self as nl_access::info::Shaped>::shape_info()
            }

            #[inline]
            fn node_ref(&self) -> nl_access::node::NodeRef<'_> {
                nl_access::node::NodeRef::Object(self)
            }

            #[inline]
            fn node_mut(&mut self) -> nl_access::node::NodeMut<'_> {
                nl_access::node::NodeMut::Object(self)
            }

            fn clone_node(
                &self,
            ) -> nl_access::__macro_exports::Box<dyn nl_access::node::Node> {
                nl_access::__macro_exports::Box::new(::core::clone::Clone::clone(self))
            }

            fn set_node(
                &mut self,
                value: nl_access::__macro_exports::Box<dyn nl_access::node::Node>,
            ) -> ::core::result::Result<
                (),
                nl_access::__macro_exports::Box<dyn nl_access::node::Node>,
            > {
                *self = value.take::<Self>()?;
                ::core::result::Result::Ok(())
            }

            #navigable_tokens
        }
    }
}

/// Generate `Object` implementation tokens.
fn impl_trait_object(info: &NodeStruct) -> TokenStream {
    let ident = &info.ident;
    let member_len = info.fields.len();

    let ref_arms = info.fields.iter().map(|field| {
        let name = &field.name;
        let getter = member_ref(field);
        quote! { #name => #getter, }
    });

    let mut_arms = info.fields.iter().filter(|field| !field.readonly).map(|field| {
        let name = &field.name;
        let getter = member_mut(field);
        quote! { #name => #getter, }
    });

    let set_arms = info.fields.iter().map(|field| {
        let name = &field.name;
        let ident = &field.ident;
        let stored_ty = &field.stored_ty;
        if field.readonly {
            return quote! {
                #name => ::core::result::Result::Err(
                    nl_access::node::MemberWriteError::ReadOnly,
                ),
            };
        }
        let assign = if field.optional {
            quote! { self.#ident = ::core::option::Option::Some(value); }
        } else {
            quote! { self.#ident = value; }
        };
        quote! {
            #name => match value.take::<#stored_ty>() {
                ::core::result::Result::Ok(value) => {
                    #assign
                    ::core::result::Result::Ok(())
                }
                ::core::result::Result::Err(value) => ::core::result::Result::Err(
                    nl_access::node::MemberWriteError::Type(value),
                ),
            },
        }
    });

    let clear_arms = info
        .fields
        .iter()
        .filter(|field| field.optional && !field.readonly)
        .map(|field| {
            let name = &field.name;
            let ident = &field.ident;
            quote! {
                #name => {
                    let was_present = self.#ident.is_some();
                    self.#ident = ::core::option::Option::None;
                    was_present
                }
            }
        });

    let at_arms = info.fields.iter().enumerate().map(|(at, field)| {
        let getter = member_ref(field);
        quote! { #at => #getter, }
    });

    let name_at_arms = info.fields.iter().enumerate().map(|(at, field)| {
        let name = &field.name;
        quote! { #at => ::core::option::Option::Some(#name), }
    });

    quote! {
        impl nl_access::node::Object for #ident {
            fn member(&self, name: &str) -> ::core::option::Option<&dyn nl_access::node::Node> {
                match name {
                    #(#ref_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn member_mut(
                &mut self,
                name: &str,
            ) -> ::core::option::Option<&mut dyn nl_access::node::Node> {
                match name {
                    #(#mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_member(
                &mut self,
                name: &str,
                value: nl_access::__macro_exports::Box<dyn nl_access::node::Node>,
            ) -> ::core::result::Result<(), nl_access::node::MemberWriteError> {
                match name {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(
                        nl_access::node::MemberWriteError::Missing,
                    ),
                }
            }

            fn clear_member(&mut self, name: &str) -> bool {
                match name {
                    #(#clear_arms)*
                    _ => false,
                }
            }

            #[inline]
            fn member_len(&self) -> usize {
                #member_len
            }

            fn member_at(
                &self,
                at: usize,
            ) -> ::core::option::Option<&dyn nl_access::node::Node> {
                match at {
                    #(#at_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn member_name_at(&self, at: usize) -> ::core::option::Option<&'static str> {
                match at {
                    #(#name_at_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}

/// The expression borrowing one member as `Option<&dyn Node>`.
fn member_ref(field: &NodeField) -> TokenStream {
    let ident = &field.ident;
    if field.optional {
        quote! {
            match &self.#ident {
                ::core::option::Option::Some(value) => {
                    ::core::option::Option::Some(value as &dyn nl_access::node::Node)
                }
                ::core::option::Option::None => ::core::option::Option::None,
            }
        }
    } else {
        quote! {
            ::core::option::Option::Some(&self.#ident as &dyn nl_access::node::Node)
        }
    }
}

/// The expression borrowing one member as `Option<&mut dyn Node>`.
fn member_mut(field: &NodeField) -> TokenStream {
    let ident = &field.ident;
    if field.optional {
        quote! {
            match &mut self.#ident {
                ::core::option::Option::Some(value) => {
                    ::core::option::Option::Some(value as &mut dyn nl_access::node::Node)
                }
                ::core::option::Option::None => ::core::option::Option::None,
            }
        }
    } else {
        quote! {
            ::core::option::Option::Some(&mut self.#ident as &mut dyn nl_access::node::Node)
        }
    }
}
