pub mod books;
pub mod token;

use std::sync::Arc;

use bookshelf_authz::TokenAuthority;
use bookshelf_kernel::ModuleRegistry;

use books::handlers::SharedStore;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: SharedStore,
    authority: Arc<TokenAuthority>,
) {
    registry.register(token::create_module(authority));
    registry.register(books::create_module(store));
}
