use crate::error::CliError;
use model::execution::chunk::TransferOutcome;
use serde::Serialize;
use tokio::sync::mpsc;

/// Prints every outcome as one JSON line on stdout until the senders are gone.
pub async fn print_outcomes(mut rx: mpsc::Receiver<TransferOutcome>) -> Result<u64, CliError> {
    let mut printed = 0;
    while let Some(outcome) = rx.recv().await {
        print_json_line(&outcome)?;
        printed += 1;
    }
    Ok(printed)
}

pub fn print_json_line<T: Serialize>(value: &T) -> Result<(), CliError> {
    let line = serde_json::to_string(value).map_err(CliError::JsonSerialize)?;
    println!("{line}");
    Ok(())
}
