use crate::{SimulationError, SimulationSummary, SummaryMessage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::sync::mpsc::Receiver;

/// How summaries are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn format_summary(id: usize, summary: &SimulationSummary) -> String {
    const WIDTH: usize = 80;
    let sim_num = format!("simulation #{}", id);
    let header = format!("{:-^WIDTH$}\n", sim_num);
    format!("{}{}{}\n", header, summary, "-".repeat(WIDTH))
}

/// Receives session summaries until every id in `ids` has finished or every sender is gone,
/// totals them per simulation and writes the totals to `writer` ordered by id.
pub fn write_summaries(
    receiver: Receiver<SummaryMessage>,
    mut ids: HashSet<usize>,
    mut writer: impl Write,
    format: OutputFormat,
) -> Result<Vec<SimulationSummary>, SimulationError> {
    let mut summaries: BTreeMap<usize, SimulationSummary> = BTreeMap::new();
    while !ids.is_empty() {
        match receiver.recv() {
            Ok(SummaryMessage::Session { id, summary }) => {
                if let Some(total) = summaries.get_mut(&id) {
                    total.merge(&summary);
                } else {
                    summaries.insert(id, summary);
                }
            }
            Ok(SummaryMessage::Finished { id }) => {
                ids.remove(&id);
            }
            // a simulation thread failed, write what was received
            Err(_) => break,
        }
    }

    match format {
        OutputFormat::Text => {
            for (id, summary) in summaries.iter() {
                writer.write_all(format_summary(*id, summary).as_bytes())?;
            }
        }
        OutputFormat::Json => {
            let totals: Vec<&SimulationSummary> = summaries.values().collect();
            serde_json::to_writer_pretty(&mut writer, &totals)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(summaries.into_values().collect())
}
