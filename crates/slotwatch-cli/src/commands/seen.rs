use clap::Subcommand;
use slotwatch_core::{DedupStore, SqliteDedupStore};

#[derive(Subcommand)]
pub enum SeenAction {
    /// Number of sessions already notified
    Count,
    /// List notified session ids with the time they were marked
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a session id as notified without sending anything
    Mark {
        /// Upstream session id
        session_id: String,
    },
    /// Forget all notified sessions
    Clear,
}

pub fn run(action: SeenAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteDedupStore::open()?;

    match action {
        SeenAction::Count => println!("{}", store.len()?),
        SeenAction::List { json } => {
            let rows = store.list()?;
            if json {
                let rows: Vec<_> = rows
                    .iter()
                    .map(|(id, at)| serde_json::json!({ "session_id": id, "seen_at": at }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for (id, at) in rows {
                    println!("{at}  {id}");
                }
            }
        }
        SeenAction::Mark { session_id } => {
            store.mark_seen(&session_id)?;
            println!("ok");
        }
        SeenAction::Clear => {
            store.clear()?;
            println!("seen sessions cleared");
        }
    }
    Ok(())
}
