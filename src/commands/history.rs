//! Print recent transcription history.

use crate::history::HistoryManager;

/// Handles the `history` command.
///
/// Prints the most recent transcriptions, newest first, with the dispatched
/// command when one matched.
pub async fn handle_history(limit: usize) -> Result<(), anyhow::Error> {
    let mut history = HistoryManager::open_default()?;
    let entries = history.recent(limit)?;

    if entries.is_empty() {
        println!("No transcriptions yet. Run 'voxlink' to record one.");
        return Ok(());
    }

    for entry in &entries {
        let timestamp = entry.created_at.format("%Y-%m-%d %H:%M:%S");
        match &entry.command {
            Some(command) => println!("#{:<4} {timestamp}  {}  -> {command}", entry.id, entry.text),
            None => println!("#{:<4} {timestamp}  {}", entry.id, entry.text),
        }
    }

    Ok(())
}
