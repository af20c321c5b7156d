use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::graph::*;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("malformed level file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level {index} ({name:?}) is invalid: {source}")]
    Graph {
        index: usize,
        name: String,
        source: GraphError,
    },

    #[error("level file contains no levels")]
    Empty,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LevelFile {
    graphs: Vec<GraphData>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct LevelFileRef<'a> {
    graphs: &'a [Graph],
}

/// Reads a `{"Graphs": [...]}` level file and validates every level.
pub fn read_levels<R: Read>(reader: R) -> Result<Vec<Graph>, LevelError> {
    let file: LevelFile = serde_json::from_reader(reader)?;

    if file.graphs.is_empty() {
        return Err(LevelError::Empty);
    }

    file.graphs
        .into_iter()
        .enumerate()
        .map(|(index, data)| {
            let name = data.name.clone();
            Graph::try_from(data).map_err(|source| LevelError::Graph {
                index,
                name,
                source,
            })
        })
        .collect()
}

pub fn write_levels<W: Write>(writer: W, graphs: &[Graph]) -> Result<(), LevelError> {
    serde_json::to_writer_pretty(writer, &LevelFileRef { graphs })?;
    Ok(())
}
