mod resource;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Resource)] derive macro
// ============================================================================

/// Derive macro for the `Resource` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Resource)]
/// #[resource(collection = "companies")]
/// struct Company {
///     #[resource(id)]
///     pub slug: String,
///     pub name: String,
///     pub num_followers: u32,
/// }
/// ```
///
/// - `#[resource(collection = "...")]` sets the collection name used in cache
///   keys and fetch endpoints. If omitted, defaults to snake_case struct
///   name + "s".
/// - `#[resource(id)]` marks the field used as the identifier. If omitted,
///   defaults to a field named `id`. Any `ToString` field works, so numeric
///   identifiers are fine.
#[proc_macro_derive(Resource, attributes(resource))]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    resource::derive_resource(input)
}
