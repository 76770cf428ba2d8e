use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::Lit::{Int, Str};
use syn::NestedMeta::Meta;
use syn::{parse_macro_input, Attribute, DeriveInput, Ident, Lifetime};
use syn::{
    Meta::{List, NameValue, Path},
    MetaList, MetaNameValue,
};

struct TlvArgs {
    start: u8,
    datatype: String,
    unordered: bool,
    lifetime: syn::Lifetime,
}

impl Default for TlvArgs {
    fn default() -> Self {
        Self {
            start: 0,
            datatype: "struct".to_string(),
            unordered: false,
            lifetime: Lifetime::new("'_", Span::call_site()),
        }
    }
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| a.path.is_ident(name))
}

fn parse_tlvargs(ast: &DeriveInput) -> TlvArgs {
    let mut tlvargs: TlvArgs = Default::default();

    let attr = match find_attr(&ast.attrs, "tlvargs") {
        Some(attr) => attr,
        None => return tlvargs,
    };
    if let Ok(List(MetaList { nested, .. })) = attr.parse_meta() {
        for a in nested {
            match a {
                Meta(NameValue(MetaNameValue {
                    path: key_path,
                    lit: key_val,
                    ..
                })) => {
                    if key_path.is_ident("start") {
                        if let Int(litint) = key_val {
                            tlvargs.start = litint
                                .base10_parse::<u8>()
                                .expect("tlvargs: start must fit in a u8");
                        }
                    } else if key_path.is_ident("lifetime") {
                        if let Str(litstr) = key_val {
                            tlvargs.lifetime = Lifetime::new(&litstr.value(), Span::call_site());
                        }
                    } else if key_path.is_ident("datatype") {
                        if let Str(litstr) = key_val {
                            tlvargs.datatype = litstr.value();
                        }
                    } else if key_path.is_ident("unordered") {
                        if let syn::Lit::Bool(b) = key_val {
                            tlvargs.unordered = b.value;
                        }
                    }
                }
                Meta(Path(path)) if path.is_ident("unordered") => tlvargs.unordered = true,
                _ => (),
            }
        }
    }
    tlvargs
}

fn parse_tag_val(field: &syn::Field) -> Option<u8> {
    let attr = find_attr(&field.attrs, "tagval")?;
    if let Ok(List(MetaList { nested, .. })) = attr.parse_meta() {
        if let Some(syn::NestedMeta::Lit(Int(litint))) = nested.first() {
            return Some(
                litint
                    .base10_parse::<u8>()
                    .expect("tagval must fit in a u8"),
            );
        }
    }
    panic!("tagval expects a single integer, e.g. #[tagval(0xFE)]");
}

/// The context tag of each named field: sequential from `start`, unless
/// overridden with `#[tagval(N)]`
fn field_tags(fields: &syn::FieldsNamed, start: u8) -> Vec<u8> {
    let mut tags = Vec::new();
    let mut tag_start = start;
    for field in fields.named.iter() {
        tags.push(parse_tag_val(field).unwrap_or(tag_start));
        tag_start = tag_start.wrapping_add(1);
    }
    tags
}

/// Shape of the type being derived
enum Shape<'a> {
    Struct(&'a syn::FieldsNamed),
    // Every variant holds exactly one unnamed field
    Enum(Vec<&'a syn::Variant>),
    // No variant holds anything
    CodeEnum(Vec<&'a syn::Variant>),
}

fn shape_of<'a>(ast: &'a DeriveInput, derive: &str) -> Shape<'a> {
    match &ast.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(fields),
            ..
        }) => Shape::Struct(fields),
        syn::Data::Enum(e) => {
            let variants: Vec<_> = e.variants.iter().collect();
            if variants
                .iter()
                .all(|v| matches!(v.fields, syn::Fields::Unit))
            {
                Shape::CodeEnum(variants)
            } else if variants
                .iter()
                .all(|v| matches!(&v.fields, syn::Fields::Unnamed(f) if f.unnamed.len() == 1))
            {
                Shape::Enum(variants)
            } else {
                panic!(
                    "Derive {} - enum variants must all be unit, or all hold one unnamed field",
                    derive
                )
            }
        }
        _ => panic!("Derive {} - only named structs and enums are supported", derive),
    }
}

fn code_type(datatype: &str, derive: &str) -> Ident {
    match datatype {
        "u8" | "u16" | "u32" => format_ident!("{}", datatype),
        _ => panic!(
            "Derive {} - enums without fields need #[tlvargs(datatype = \"u8\")] (or u16/u32)",
            derive
        ),
    }
}

/// Derive ToTLV Macro
///
/// This macro works for structures and enums. For a structure it will create
/// an implementation of the ToTLV trait that writes all the members of the
/// structure sequentially, with Context tags starting from 0.
/// Some configurations are possible through the 'tlvargs' attributes.
/// For example:
///  #[tlvargs(start = 1, datatype = "list")]
///
/// start: This can be used to override the default tag from which the
///        encoding starts (Default: 0)
/// datatype: This can be used to define whether this data structure is
///        to be encoded as a structure or list. Possible values: list
///        (Default: struct). For enums without fields: u8, u16 or u32
///
/// A single member's tag can be set with #[tagval(N)].
///
/// Enums whose variants hold one value are encoded as a structure with one
/// member, tagged with the variant's index. Enums without fields are encoded
/// as an integer holding the discriminant.
///
/// If writing any member fails, everything written for this value is
/// rolled back.

#[proc_macro_derive(ToTLV, attributes(tlvargs, tagval))]
pub fn derive_totlv(item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as DeriveInput);
    let name = &ast.ident;
    let tlvargs = parse_tlvargs(&ast);
    let generics = &ast.generics;

    let body = match shape_of(&ast, "ToTLV") {
        Shape::Struct(fields) => {
            let datatype = format_ident!("start_{}", tlvargs.datatype);
            let idents: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
            let tags = field_tags(fields, tlvargs.start);
            quote! {
                tw.#datatype(tag_type)?;
                #(
                    self.#idents.to_tlv(tw, TagType::Context(#tags))?;
                )*
                tw.end_container()
            }
        }
        Shape::Enum(variants) => {
            let datatype = format_ident!("start_{}", tlvargs.datatype);
            let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
            let tags: Vec<u8> = (0..variants.len())
                .map(|i| tlvargs.start.wrapping_add(i as u8))
                .collect();
            quote! {
                tw.#datatype(tag_type)?;
                match self {
                    #(
                        Self::#idents(c) => c.to_tlv(tw, TagType::Context(#tags))?,
                    )*
                }
                tw.end_container()
            }
        }
        Shape::CodeEnum(variants) => {
            let code = code_type(&tlvargs.datatype, "ToTLV");
            let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
            quote! {
                let value: #code = match self {
                    #(
                        Self::#idents => Self::#idents as #code,
                    )*
                };
                tw.#code(tag_type, value)
            }
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let expanded = quote! {
        impl #impl_generics ToTLV for #name #ty_generics #where_clause {
            fn to_tlv(&self, tw: &mut TLVWriter, tag_type: TagType) -> Result<(), Error> {
                let anchor = tw.get_anchor();
                let result = (|| -> Result<(), Error> { #body })();
                if result.is_err() {
                    tw.rewind_to(anchor);
                }
                result
            }
        }
    };
    expanded.into()
}

fn fromtlv_struct_ordered(
    fields: &syn::FieldsNamed,
    tags: &[u8],
    enter: &Ident,
) -> TokenStream2 {
    let idents: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
    let types: Vec<_> = fields.named.iter().map(|f| &f.ty).collect();
    quote! {
        tr.#enter(tag_type)?;
        #(
            let #idents = if tr.is_next_tag(TagType::Context(#tags)) {
                <#types>::from_tlv(tr, TagType::Context(#tags))
            } else {
                <#types>::tlv_not_found()
            }?;
        )*
        tr.exit_container()?;
        Ok(Self {
            #(#idents,
            )*
        })
    }
}

fn fromtlv_struct_unordered(
    fields: &syn::FieldsNamed,
    tags: &[u8],
    enter: &Ident,
) -> TokenStream2 {
    let idents: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
    let types: Vec<_> = fields.named.iter().map(|f| &f.ty).collect();
    quote! {
        tr.#enter(tag_type)?;
        #(
            let mut #idents: Option<#types> = None;
        )*
        while !tr.is_end_of_container() {
            match tr.peek_element()?.get_tag() {
                #(
                    TagType::Context(#tags) => {
                        if #idents.is_some() {
                            return Err(Error::Duplicate);
                        }
                        #idents = Some(<#types>::from_tlv(tr, TagType::Context(#tags))?);
                    }
                )*
                _ => tr.skip_element()?,
            }
        }
        tr.exit_container()?;
        Ok(Self {
            #(
                #idents: match #idents {
                    Some(v) => v,
                    None => <#types>::tlv_not_found()?,
                },
            )*
        })
    }
}

/// Derive FromTLV Macro
///
/// This macro works for structures and enums. For a structure it will create
/// an implementation of the FromTLV trait that reads all the members of the
/// structure, sequentially, with Context tags starting from 0.
/// Some configurations are possible through the 'tlvargs' attributes.
/// For example:
///  #[tlvargs(lifetime = "'a", start = 1, datatype = "list", unordered)]
///
/// start: This can be used to override the default tag from which the
///        decoding starts (Default: 0)
/// datatype: This can be used to define whether this data structure is
///        to be decoded as a structure or list. Possible values: list
///        (Default: struct). For enums without fields: u8, u16 or u32
/// lifetime: If the structure has a lifetime annotation, use this variable
///        to indicate that. The 'impl' will then use that lifetime
///        indicator.
/// unordered: By default, the decoder expects that the tags are in
///        the declared order. Set this if that is not the case. A tag that
///        appears twice is then rejected.
///
/// Members that are absent from the stream take the value given by their
/// type's `tlv_not_found()`: `None` for `Option`, an error for the rest.
/// Elements with unknown tags are skipped.

#[proc_macro_derive(FromTLV, attributes(tlvargs, tagval))]
pub fn derive_fromtlv(item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as DeriveInput);
    let name = &ast.ident;
    let tlvargs = parse_tlvargs(&ast);
    let lifetime = &tlvargs.lifetime;
    let generics = &ast.generics;

    let body = match shape_of(&ast, "FromTLV") {
        Shape::Struct(fields) => {
            let enter = format_ident!("enter_{}", tlvargs.datatype);
            let tags = field_tags(fields, tlvargs.start);
            if tlvargs.unordered {
                fromtlv_struct_unordered(fields, &tags, &enter)
            } else {
                fromtlv_struct_ordered(fields, &tags, &enter)
            }
        }
        Shape::Enum(variants) => {
            let enter = format_ident!("enter_{}", tlvargs.datatype);
            let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
            let types: Vec<_> = variants
                .iter()
                .map(|v| match &v.fields {
                    syn::Fields::Unnamed(f) => &f.unnamed[0].ty,
                    _ => unreachable!(),
                })
                .collect();
            let tags: Vec<u8> = (0..variants.len())
                .map(|i| tlvargs.start.wrapping_add(i as u8))
                .collect();
            quote! {
                tr.#enter(tag_type)?;
                let result = match tr.peek_element()?.get_tag() {
                    #(
                        TagType::Context(#tags) => {
                            Self::#idents(<#types>::from_tlv(tr, TagType::Context(#tags))?)
                        }
                    )*
                    _ => return Err(Error::InvalidData),
                };
                tr.exit_container()?;
                Ok(result)
            }
        }
        Shape::CodeEnum(variants) => {
            let code = code_type(&tlvargs.datatype, "FromTLV");
            let getter = format_ident!("get_{}", code);
            let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
            quote! {
                let value = tr.#getter(tag_type)?;
                #(
                    if value == Self::#idents as #code {
                        return Ok(Self::#idents);
                    }
                )*
                Err(Error::InvalidData)
            }
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let expanded = quote! {
        impl #impl_generics FromTLV<#lifetime> for #name #ty_generics #where_clause {
            fn from_tlv(tr: &mut TLVReader<#lifetime>, tag_type: TagType) -> Result<Self, Error> {
                #body
            }
        }
    };
    expanded.into()
}
