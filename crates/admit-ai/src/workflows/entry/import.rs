use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

/// One activity description loaded for batch scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySubmission {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: String,
}

#[derive(Debug)]
pub enum EntryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for EntryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryImportError::Io(err) => write!(f, "failed to read entry export: {}", err),
            EntryImportError::Csv(err) => write!(f, "invalid entry CSV data: {}", err),
        }
    }
}

impl std::error::Error for EntryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EntryImportError::Io(err) => Some(err),
            EntryImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for EntryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for EntryImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn read_entries_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<EntrySubmission>, EntryImportError> {
    let file = std::fs::File::open(path)?;
    read_entries(file)
}

/// Parse `id,title,description` rows. Cells are trimmed; empty ids and titles become `None`.
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<EntrySubmission>, EntryImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for record in csv_reader.deserialize::<EntryRow>() {
        let row = record?;
        entries.push(EntrySubmission {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
        });
    }

    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct EntryRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
