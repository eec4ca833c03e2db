//! A small newsroom run through the Quill workflow.
//!
//! This example demonstrates:
//! - Building an engine over in-memory stores
//! - Submitting, reviewing and approving articles
//! - The auto-publish cascade for high-scoring articles
//! - Bulk approval and scheduled publication
//! - Observing workflow events
//! - Printing the analytics report
//!
//! Run with: `RUST_LOG=quill=debug cargo run --example newsroom`

use chrono::{Duration, Utc};
use quill::{
    Article, ArticleStore, Clock, ManualClock, MemoryArticleStore, MemoryNotifier, MemoryTransitionLog,
    Result, WorkflowAction, WorkflowEngine, WorkflowEvent, WorkflowState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const BODY: &str = "The Roads and Transport Authority opened the new line on Monday, \
    linking the airport to the old town with twelve stations along the creek.";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "quill=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("📰 Quill newsroom demo\n");

    let store = MemoryArticleStore::new();
    let notifier = MemoryNotifier::new();
    let clock = ManualClock::new(Utc::now());
    let engine = WorkflowEngine::builder()
        .article_store(store.clone())
        .transition_log(MemoryTransitionLog::new())
        .notifier(notifier.clone())
        .clock(clock.clone())
        .build()?;

    // Print events as they happen
    let mut events = engine.subscribe();
    let watcher = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                WorkflowEvent::TransitionCommitted {
                    article_id, from, to, ..
                } => println!("  ✓ {article_id}: {from} → {to}"),
                WorkflowEvent::TransitionRejected { article_id, error, .. } => {
                    println!("  ✗ {article_id}: {error}")
                }
                WorkflowEvent::CascadeTriggered { article_id, action } => {
                    println!("  ↪ {article_id}: cascading {action}")
                }
                _ => {}
            }
        }
    });

    let desk = [
        ("metro", "Dubai Launches New Metro Line", 95.0),
        ("port", "Port Traffic Hits Record High", 72.0),
        ("heat", "Summer Heat Advisory Extended", 45.0),
        ("expo", "Expo Site Reopens to Visitors", 81.0),
    ];
    for (id, title, score) in desk {
        store
            .insert_article(
                &Article::new(id, title, BODY, "writer1")
                    .with_category("city")
                    .with_ai_confidence_score(score),
            )
            .await?;
    }

    println!("Submitting the desk for review...");
    for (id, _, _) in desk {
        engine
            .transition_article(id, WorkflowAction::SubmitForReview, "writer1", None, None)
            .await?;
        clock.advance(Duration::minutes(20));
        engine
            .transition_article(id, WorkflowAction::AssignReviewer, "editor1", None, None)
            .await?;
    }

    clock.advance(Duration::hours(3));
    println!("\nBulk approval...");
    let ids: Vec<&str> = desk.iter().map(|(id, _, _)| *id).collect();
    let approved = engine.bulk_approve(&ids, "editor1").await;
    println!("  {approved} of {} approved", ids.len());

    println!("\nSending the heat advisory back for revision...");
    engine
        .transition_article(
            "heat",
            WorkflowAction::RequestRevision,
            "editor1",
            Some("Needs a quote from the Met office"),
            None,
        )
        .await?;

    println!("\nScheduling the port story for tomorrow morning...");
    engine
        .schedule_article("port", clock.now() + Duration::hours(14), "editor1")
        .await?;
    clock.advance(Duration::hours(15));
    let published = engine.publish_due_articles().await?;
    println!("  scheduler published {published} article(s)");

    let live = engine
        .get_articles_by_state(WorkflowState::Published, 10)
        .await?;
    println!("\nLive now:");
    for article in &live {
        println!("  • {}", article.title);
    }

    println!("\nNotifications to writer1:");
    for n in notifier.sent_to("writer1").await {
        println!("  [{}] {}", n.kind, n.message);
    }

    println!("\nHistory of 'metro':");
    for t in engine.get_workflow_history("metro").await? {
        println!(
            "  {} {} → {} by {}",
            t.action, t.from_state, t.to_state, t.performed_by
        );
    }

    println!("\n{}", engine.get_workflow_analytics(30).await?);

    drop(engine);
    let _ = watcher.await;
    Ok(())
}
