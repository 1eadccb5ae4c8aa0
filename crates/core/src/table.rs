//! Table definitions (pure data).

use std::fmt;

/// Table schema and provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub throughput: ProvisionedThroughput,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: ScalarType,
}

impl KeyAttribute {
    pub fn new(name: impl Into<String>, attribute_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }
}

/// Scalar types allowed for key attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Number,
    String,
}

impl ScalarType {
    /// Store type code (`N` or `S`).
    pub fn code(self) -> &'static str {
        match self {
            ScalarType::Number => "N",
            ScalarType::String => "S",
        }
    }
}

/// Read and write capacity units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionedThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

/// Table provisioning status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            TableStatus::Creating => "CREATING",
            TableStatus::Active => "ACTIVE",
            TableStatus::Updating => "UPDATING",
            TableStatus::Deleting => "DELETING",
        };
        f.write_str(status)
    }
}

/// What the store reports about a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub table_name: String,
    pub status: TableStatus,
    pub item_count: Option<i64>,
}

impl TableDefinition {
    /// Sets the table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Names of the key attributes, partition key first.
    pub fn key_names(&self) -> Vec<&str> {
        let mut names = vec![self.partition_key.name.as_str()];
        if let Some(sk) = &self.sort_key {
            names.push(sk.name.as_str());
        }
        names
    }
}

/// Returns the canonical `Movies` table: `year` (N) partition key,
/// `title` (S) sort key, 10 read and 10 write units.
/// This is a pure function - no I/O.
pub fn movies_table_definition() -> TableDefinition {
    TableDefinition {
        table_name: "Movies".to_string(),
        partition_key: KeyAttribute::new("year", ScalarType::Number),
        sort_key: Some(KeyAttribute::new("title", ScalarType::String)),
        throughput: ProvisionedThroughput {
            read_capacity_units: 10,
            write_capacity_units: 10,
        },
    }
}

/// Pure function: describe a definition for display before it is applied.
pub fn format_table_definition(definition: &TableDefinition) -> Vec<String> {
    let mut lines = vec![
        format!("+ Create table: {}", definition.table_name),
        format!(
            "  Partition key: {} ({})",
            definition.partition_key.name,
            definition.partition_key.attribute_type.code()
        ),
    ];
    if let Some(sk) = &definition.sort_key {
        lines.push(format!(
            "  Sort key: {} ({})",
            sk.name,
            sk.attribute_type.code()
        ));
    }
    lines.push(format!(
        "  Throughput: {} RCU / {} WCU",
        definition.throughput.read_capacity_units, definition.throughput.write_capacity_units
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movies_table_definition() {
        let def = movies_table_definition();
        assert_eq!(def.table_name, "Movies");
        assert_eq!(def.partition_key, KeyAttribute::new("year", ScalarType::Number));
        assert_eq!(
            def.sort_key,
            Some(KeyAttribute::new("title", ScalarType::String))
        );
        assert_eq!(def.throughput.read_capacity_units, 10);
        assert_eq!(def.throughput.write_capacity_units, 10);
        assert_eq!(def.key_names(), vec!["year", "title"]);
    }

    #[test]
    fn test_with_table_name() {
        let def = movies_table_definition().with_table_name("MoviesTest");
        assert_eq!(def.table_name, "MoviesTest");
    }

    #[test]
    fn test_format_table_definition() {
        let lines = format_table_definition(&movies_table_definition());
        assert_eq!(
            lines,
            vec![
                "+ Create table: Movies",
                "  Partition key: year (N)",
                "  Sort key: title (S)",
                "  Throughput: 10 RCU / 10 WCU",
            ]
        );
    }
}
