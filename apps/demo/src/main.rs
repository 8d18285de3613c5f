use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use nav_adapters::{SplitPresenter, StackPresenter, TabsPresenter};
use nav_core::{
    Category, ModalPresenter, Presentable, SerialHandler, StructuredPresenter, Transition,
};
use tracing::info;

mod config;

use config::load_settings;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.clone())
        .init();

    // Surface tree: a tab container hosting a master/detail split and a
    // plain stack, each driven by its own serial handler.
    let tabs = Arc::new(TabsPresenter::new("root-tabs"));
    let collapsed = Arc::new(AtomicBool::new(false));
    let library = Arc::new(SplitPresenter::new("library", {
        let collapsed = Arc::clone(&collapsed);
        Arc::new(move || collapsed.load(Ordering::SeqCst))
    }));
    let inbox = Arc::new(StackPresenter::new("inbox"));

    let tabs_handler = SerialHandler::with_config(tabs.clone(), settings.handler_config());
    let library_handler = SerialHandler::with_config(library.clone(), settings.handler_config());
    let inbox_handler = SerialHandler::with_config(inbox.clone(), settings.handler_config());

    let library_tab = Presentable::new("library");
    let inbox_tab = Presentable::new("inbox");
    tabs_handler
        .handle(Transition::non_animated(Category::ResetTo(vec![
            library_tab,
            inbox_tab.clone(),
        ])))
        .await?;
    tabs_handler
        .handle(Transition::new(Category::MoveTo(inbox_tab)))
        .await?;
    let selected = tabs.selected().await.map(|tab| tab.label().to_string());
    info!(?selected, "tab selected");

    let overview = Presentable::new("overview");
    let article = Presentable::new("article");
    let related = Presentable::new("related");
    library_handler
        .handle(Transition::non_animated(Category::ResetTo(vec![
            overview, article, related,
        ])))
        .await?;
    let expanded = presented_labels(library.as_ref()).await;
    info!(?expanded, "library populated while expanded");

    // Collapse the split and dismiss the topmost structured entry; the drop
    // must route to the master stack.
    collapsed.store(true, Ordering::SeqCst);
    library_handler
        .handle(Transition::new(Category::Dismiss { all: false }))
        .await?;
    let remaining = presented_labels(library.as_ref()).await;
    info!(?remaining, "library after collapsed dismiss");

    // Two identical modal presentations coalesce into one execution.
    let compose = Presentable::new("compose");
    let present = Transition::animated(Category::ModalPresent(compose));
    let (first, second) = tokio::join!(
        inbox_handler.handle(present.clone()),
        inbox_handler.handle(present),
    );
    first?;
    second?;
    let modal = inbox
        .current_modal_presented()
        .await
        .map(|layer| layer.label().to_string());
    info!(?modal, "compose sheet up");

    inbox_handler
        .handle(Transition::new(Category::Dismiss { all: true }))
        .await?;
    let modal = inbox.current_modal_presented().await;
    info!(?modal, "inbox cleared");

    Ok(())
}

async fn presented_labels(presenter: &dyn StructuredPresenter) -> Vec<String> {
    presenter
        .all_structured_presented()
        .await
        .into_iter()
        .map(|presentable| presentable.label().to_string())
        .collect()
}
