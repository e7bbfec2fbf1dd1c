//! Derive macro for [`envfig`](https://docs.rs/envfig).
//!
//! `#[derive(Config)]` turns a struct with named fields into a configuration
//! schema. Each field is described by a `#[config(...)]` attribute:
//!
//! - `env = "KEY"`: the variable the field is read from
//! - `secret = "KEY"`: like `env`, and the value is masked when printed; on
//!   a `nested` field the whole sub-struct is masked and its leaves are
//!   listed as secret
//! - `default = "literal"`: used when the variable is absent and the field
//!   still holds its zero value; integer, float and bool literals are
//!   accepted too
//! - `required`, `required = true` or `required = "true"`: fail if no value
//!   resolves
//! - `nested`: the field is itself a schema (by value, `Option`, or `Box`)
//! - `skip`: the field is ignored
//!
//! Fields without `env` or `secret` are read from a variable named after the
//! field.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Data, DeriveInput, Expr, ExprLit, ExprUnary, Field, Fields, Lit, LitStr, Token, UnOp,
    parse_macro_input,
};

#[proc_macro_derive(Config, attributes(config))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Parsed `#[config(...)]` attributes of one field.
#[derive(Default)]
struct FieldAttrs {
    env: Option<String>,
    secret: Option<String>,
    default: Option<String>,
    required: bool,
    nested: bool,
    skip: bool,
    tags: Vec<(String, String)>,
}

impl FieldAttrs {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();
        let mut nested_conflict = None;

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("config")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("env") {
                    let value = meta.value()?.parse::<LitStr>()?.value();
                    attrs.tags.push(("env".into(), value.clone()));
                    attrs.env = Some(value);
                } else if meta.path.is_ident("secret") {
                    let value = meta.value()?.parse::<LitStr>()?.value();
                    attrs.tags.push(("secret".into(), value.clone()));
                    attrs.secret = Some(value);
                } else if meta.path.is_ident("default") {
                    let value = literal_text(&meta.value()?.parse::<Expr>()?)?;
                    attrs.tags.push(("default".into(), value.clone()));
                    attrs.default = Some(value);
                    nested_conflict.get_or_insert(meta.path.clone());
                } else if meta.path.is_ident("required") {
                    let text = if meta.input.peek(Token![=]) {
                        match meta.value()?.parse::<Lit>()? {
                            Lit::Str(s) => s.value(),
                            Lit::Bool(b) => b.value.to_string(),
                            other => {
                                return Err(syn::Error::new_spanned(
                                    other,
                                    "expected `true`, `false` or a string",
                                ));
                            }
                        }
                    } else {
                        "true".to_string()
                    };
                    attrs.required = text.eq_ignore_ascii_case("true");
                    attrs.tags.push(("required".into(), text));
                    nested_conflict.get_or_insert(meta.path.clone());
                } else if meta.path.is_ident("nested") {
                    attrs.nested = true;
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                } else {
                    return Err(meta.error(
                        "unknown config attribute; expected env, secret, default, required, nested or skip",
                    ));
                }
                Ok(())
            })?;
        }

        if attrs.nested
            && let Some(path) = nested_conflict
        {
            return Err(syn::Error::new_spanned(
                path,
                "`default` and `required` apply to leaf fields, not `nested` ones",
            ));
        }

        Ok(attrs)
    }
}

/// The text of a literal default: strings as-is, numbers and bools as
/// written.
fn literal_text(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(syn::Error::new_spanned(other, "unsupported default literal")),
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => Ok(format!("-{}", literal_text(expr)?)),
        other => Err(syn::Error::new_spanned(
            other,
            "default must be a string, number or bool literal",
        )),
    }
}

fn opt(value: &Option<String>) -> TokenStream2 {
    match value {
        Some(v) => quote!(::core::option::Option::Some(#v)),
        None => quote!(::core::option::Option::None),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Config cannot be derived for tuple structs",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Config can only be derived for structs with named fields",
            ));
        }
    };

    let mut metas = Vec::new();
    let mut populate = Vec::new();
    let mut redact = Vec::new();
    let mut collect = Vec::new();
    let mut errors: Option<syn::Error> = None;

    for field in fields {
        let attrs = match FieldAttrs::parse(field) {
            Ok(attrs) => attrs,
            Err(e) => {
                match &mut errors {
                    Some(all) => all.combine(e),
                    None => errors = Some(e),
                }
                continue;
            }
        };
        if attrs.skip {
            continue;
        }

        let Some(ident) = &field.ident else { continue };
        let ty = &field.ty;
        let name = ident.unraw().to_string();
        let index = metas.len();

        let env = opt(&attrs.env);
        let secret = opt(&attrs.secret);
        let default = opt(&attrs.default);
        let required = attrs.required;
        let nested = attrs.nested;
        let tags = attrs.tags.iter().map(|(k, v)| quote!((#k, #v)));

        metas.push(quote! {
            ::envfig::FieldMeta {
                name: #name,
                env: #env,
                secret: #secret,
                default: #default,
                required: #required,
                nested: #nested,
                tags: &[#(#tags),*],
            }
        });

        if nested {
            populate.push(quote!(loader.nested(&Self::FIELDS[#index], &mut self.#ident)?;));
            redact.push(quote!(::envfig::render::nested(&Self::FIELDS[#index], &self.#ident, out);));
            collect.push(quote!(::envfig::settings::nested::<#ty>(prefix, &Self::FIELDS[#index], out);));
        } else {
            populate.push(quote!(loader.leaf(&Self::FIELDS[#index], &mut self.#ident)?;));
            redact.push(quote!(::envfig::render::leaf(&Self::FIELDS[#index], &self.#ident, out);));
            collect.push(quote!(::envfig::settings::leaf::<#ty>(prefix, &Self::FIELDS[#index], out);));
        }
    }

    if let Some(errors) = errors {
        return Err(errors);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::envfig::Config for #ident #ty_generics #where_clause {
            const FIELDS: &'static [::envfig::FieldMeta] = &[#(#metas),*];

            #[allow(unused_variables)]
            fn populate(
                &mut self,
                loader: &::envfig::Loader<'_>,
            ) -> ::core::result::Result<(), ::envfig::EnvfigError> {
                #(#populate)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn redact(&self, out: &mut ::envfig::render::Snapshot) {
                #(#redact)*
            }

            #[allow(unused_variables)]
            fn collect(prefix: &str, out: &mut ::std::vec::Vec<::envfig::FieldSetting>) {
                #(#collect)*
            }
        }

        impl #impl_generics ::envfig::Nested for #ident #ty_generics #where_clause {
            fn populate_nested(
                &mut self,
                loader: &::envfig::Loader<'_>,
            ) -> ::core::result::Result<(), ::envfig::EnvfigError> {
                ::envfig::Config::populate(self, loader)
            }

            fn snapshot_nested(&self) -> ::envfig::serde_json::Value {
                ::envfig::render::snapshot(self)
            }

            fn collect_nested(prefix: &str, out: &mut ::std::vec::Vec<::envfig::FieldSetting>) {
                <Self as ::envfig::Config>::collect(prefix, out)
            }
        }
    })
}
