//! Paginate any sea-orm select.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};
use yatube_common::{AppError, AppResult, Page, PageWindow};

/// Count `select`, resolve the requested page against it and fetch that slice.
///
/// Runs two queries: a `COUNT(*)` over the select, then the page itself.
pub async fn paginate<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    requested: Option<&str>,
    per_page: u64,
) -> AppResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let per_page = per_page.max(1);
    let paginator = select.paginate(db, per_page);

    let count = paginator
        .num_items()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    let window = PageWindow::new(count, requested, per_page);

    let items = paginator
        .fetch_page(window.index())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Page::new(window, items))
}
