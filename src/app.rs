//! Process bootstrap shared by the `bookshelf` binary and the CLI.

use std::sync::Arc;

use anyhow::Context;
use bookshelf_authz::TokenAuthority;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::PgPool;

use crate::modules::{
    self,
    books::{handlers::SharedStore, store::PgBookStore},
};

/// Registry with every module wired to `store` and `authority`.
pub fn build_registry(store: SharedStore, authority: Arc<TokenAuthority>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, authority);
    registry
}

fn registry_for(pool: &PgPool, settings: &Settings) -> (ModuleRegistry, Arc<TokenAuthority>) {
    let store: SharedStore = Arc::new(PgBookStore::new(pool.clone()));
    let authority = Arc::new(TokenAuthority::from_settings(&settings.auth));
    (build_registry(store, authority.clone()), authority)
}

/// Connect, apply schemas and serve until shutdown.
///
/// Any failure before the listener is up aborts startup.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let pool = bookshelf_db::connect(&settings.database)
        .await
        .context("cannot reach the book store")?;
    let (registry, authority) = registry_for(&pool, &settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    bookshelf_db::apply_migrations(&pool, &registry.collect_migrations())
        .await
        .context("cannot apply schema")?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, &settings, authority).await;
    let stopped = registry.stop_modules().await;
    pool.close().await;

    shutdown_outcome(served, stopped)
}

/// A server failure outranks a failed module stop; the latter is only logged.
fn shutdown_outcome(served: anyhow::Result<()>, stopped: anyhow::Result<()>) -> anyhow::Result<()> {
    match (served, stopped) {
        (Err(served), Err(stopped)) => {
            tracing::error!(error = %format!("{stopped:#}"), "module shutdown failed");
            Err(served)
        }
        (served, stopped) => served.and(stopped),
    }
}

/// Apply module schemas and exit.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookshelf_db::connect(&settings.database)
        .await
        .context("cannot reach the book store")?;
    let (registry, _) = registry_for(&pool, settings);

    let migrations = registry.collect_migrations();
    bookshelf_db::apply_migrations(&pool, &migrations).await?;
    pool.close().await;

    Ok(migrations.len())
}
