use convert_case::{Case, Casing};
use darling::{FromDeriveInput, FromVariant};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{parse_macro_input, Data, DataEnum, DeriveInput};

#[proc_macro_derive(Vocabulary, attributes(vocabulary))]
pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = EnumOpts::from_derive_input(&input).expect("Unable to parse vocabulary options");

    let data = match &input.data {
        Data::Enum(data) => data,
        _ => panic!("Derive can only be used on enum types"),
    };

    let info = collect(data, opts.prefix.as_deref().unwrap_or_default());

    let expanded_names = expand_names(&input.ident, &info);
    let expanded_families = expand_families(&input.ident, &info);

    let expanded = quote! {
        #expanded_names

        #expanded_families
    };

    proc_macro::TokenStream::from(expanded)
}

fn expand_names(ident: &Ident, info: &Info) -> TokenStream {
    let all = info.words.iter().map(|word| {
        let ident = &word.ident;
        quote! { Self::#ident }
    });

    let names = info.words.iter().map(|word| {
        let ident = &word.ident;
        let name = &word.name;
        quote! { Self::#ident => #name }
    });

    let keywords = info.words.iter().map(|word| {
        let ident = &word.ident;
        let keyword = &word.keyword;
        quote! { Self::#ident => #keyword }
    });

    let from_names = info.words.iter().map(|word| {
        let ident = &word.ident;
        let name = &word.name;
        quote! { #name => Self::#ident }
    });

    let from_keywords = info.words.iter().map(|word| {
        let ident = &word.ident;
        let keyword = &word.keyword;
        quote! { #keyword => Self::#ident }
    });

    quote! {
        impl #ident {
            /// All entries, in declaration order.
            pub const ALL: &'static [Self] = &[ #(#all, )* ];

            /// The full name, including the symbol prefix.
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#names, )*
                }
            }

            /// The name without the symbol prefix, as used in bracket tags.
            pub const fn keyword(&self) -> &'static str {
                match self {
                    #(#keywords, )*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                Some(match name {
                    #(#from_names, )*
                    _ => return None,
                })
            }

            pub fn from_keyword(keyword: &str) -> Option<Self> {
                Some(match keyword {
                    #(#from_keywords, )*
                    _ => return None,
                })
            }
        }

        impl ::core::fmt::Display for #ident {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

fn expand_families(ident: &Ident, info: &Info) -> TokenStream {
    let families = info
        .words
        .iter()
        .filter_map(|word| word.family.as_ref().map(|family| (&word.ident, family)))
        .map(|(ident, family)| {
            quote! { Self::#ident => qsfilter::vocabulary::Family::#family }
        })
        .collect::<Vec<_>>();

    match families.len() {
        0 => quote! {},
        n if n == info.words.len() => quote! {
            impl #ident {
                pub const fn family(&self) -> qsfilter::vocabulary::Family {
                    match self {
                        #(#families, )*
                    }
                }
            }
        },
        _ => panic!("Either all or no variants must declare a family"),
    }
}

struct Info {
    words: Vec<Word>,
}

struct Word {
    ident: Ident,
    keyword: String,
    name: String,
    family: Option<Ident>,
}

#[derive(FromDeriveInput, Default)]
#[darling(default, attributes(vocabulary))]
struct EnumOpts {
    // Symbol prefix, e.g. `$`
    prefix: Option<String>,
}

#[derive(FromVariant, Default)]
#[darling(default, attributes(vocabulary))]
struct VariantOpts {
    rename: Option<String>,
    family: Option<String>,
}

fn collect(data: &DataEnum, prefix: &str) -> Info {
    let mut words = vec![];

    for variant in &data.variants {
        if !variant.fields.is_empty() {
            panic!("Variant must not have any fields");
        }

        let opts = VariantOpts::from_variant(variant).expect("Unable to parse variant options");

        let keyword = opts
            .rename
            .unwrap_or_else(|| variant.ident.to_string().to_case(Case::Camel));

        words.push(Word {
            ident: variant.ident.clone(),
            name: format!("{prefix}{keyword}"),
            keyword,
            family: opts
                .family
                .map(|family| Ident::new(&family, variant.ident.span())),
        });
    }

    Info { words }
}
