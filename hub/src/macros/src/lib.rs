mod event;
mod schema;

use proc_macro::TokenStream;

/// Implements `typed_hub::Event` for a unit struct.
///
/// ```rust,ignore
/// #[derive(Event)]
/// #[event(schema = Chat, args = (String, u32), name = "message")]
/// struct Message;
/// ```
///
/// - `schema` (required): the schema type
/// - `args`: payload tuple, `()` when omitted
/// - `name = "..."` or `index = N`: string or numeric key; without either the
///   key is a symbol bound to the struct's type
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(item: TokenStream) -> TokenStream {
    event::derive_event(item)
}

#[proc_macro_derive(Schema)]
pub fn derive_schema(item: TokenStream) -> TokenStream {
    schema::derive_schema(item)
}
