//! Result set storage and typed-row materialization.
//!
//! A [`ResultSet`] owns the result metadata plus one slot per partition of
//! raw row data. Partitions are fetched concurrently and land in their slots
//! in arrival order, but materialization always walks the slots in ascending
//! partition order, so row order is stable regardless of network timing.

use crate::error::QueryError;
use crate::transport::{ResultSetMetaData, RowType};
use crate::types::{TypeCoercer, Value};
use indexmap::IndexMap;
use tracing::warn;

/// Raw rows for one partition, exactly as delivered by the service.
pub(crate) type RawRows = Vec<Vec<serde_json::Value>>;

/// Lifecycle state of a submitted statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Accepted by the service, not yet observed in progress
    Submitted,
    /// At least one poll has seen the statement still running
    Running,
    /// Completed with a result set
    Succeeded,
    /// The client-side timeout elapsed and cancellation was not acknowledged
    TimedOut,
    /// The client-side timeout elapsed and cancellation was acknowledged
    Cancelled,
    /// Terminal failure reported by the service
    Failed,
}

impl ExecutionState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Succeeded | ExecutionState::Cancelled | ExecutionState::Failed
        )
    }
}

/// One column of the result, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Declared type name from the service (e.g. `FIXED`, `TEXT`, `DATE`)
    pub column_type: String,
}

impl From<&RowType> for ColumnDescriptor {
    fn from(row_type: &RowType) -> Self {
        Self {
            name: row_type.name.clone(),
            column_type: row_type.column_type.clone(),
        }
    }
}

/// Result metadata, captured once from the first successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMetadata {
    /// Total rows across all partitions
    pub row_count: u64,
    /// Number of result partitions
    pub partition_count: usize,
    /// Column descriptors in declared order
    pub columns: Vec<ColumnDescriptor>,
}

impl ResultMetadata {
    /// Build metadata from the wire shape, validating required fields.
    ///
    /// # Errors
    /// Returns [`QueryError::Protocol`] naming the missing field when a
    /// success-coded response arrived without complete metadata.
    pub(crate) fn from_wire(meta: &ResultSetMetaData) -> Result<Self, QueryError> {
        let row_count = meta.num_rows.ok_or_else(|| QueryError::Protocol {
            field: "numRows".to_string(),
        })?;
        let partition_info =
            meta.partition_info
                .as_ref()
                .ok_or_else(|| QueryError::Protocol {
                    field: "partitionInfo".to_string(),
                })?;
        let row_type = meta.row_type.as_ref().ok_or_else(|| QueryError::Protocol {
            field: "rowType".to_string(),
        })?;

        Ok(Self {
            row_count,
            partition_count: partition_info.len(),
            columns: row_type.iter().map(ColumnDescriptor::from).collect(),
        })
    }

    fn empty() -> Self {
        Self {
            row_count: 0,
            partition_count: 0,
            columns: Vec::new(),
        }
    }
}

/// One materialized row: column name to native value, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    cells: IndexMap<String, Value>,
}

impl TypedRow {
    fn new(cells: IndexMap<String, Value>) -> Self {
        Self { cells }
    }

    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Column names in declared order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(|k| k.as_str())
    }

    /// Iterate cells in declared column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Consume the row, yielding the underlying ordered map.
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.cells
    }
}

/// A completed query result: metadata plus partitioned raw rows.
#[derive(Debug, Clone)]
pub struct ResultSet {
    metadata: ResultMetadata,
    partitions: Vec<Option<RawRows>>,
    state: ExecutionState,
}

impl ResultSet {
    /// Create a result set with one empty slot per partition.
    pub(crate) fn new(metadata: ResultMetadata) -> Self {
        let partition_count = metadata.partition_count;
        Self {
            metadata,
            partitions: vec![None; partition_count],
            state: ExecutionState::Running,
        }
    }

    /// An empty result carrying only a terminal state (the timeout path).
    pub(crate) fn empty(state: ExecutionState) -> Self {
        Self {
            metadata: ResultMetadata::empty(),
            partitions: Vec::new(),
            state,
        }
    }

    /// Store raw rows for one partition. `index` is 1-based and each slot
    /// is written at most once.
    pub(crate) fn store_partition(&mut self, index: usize, rows: RawRows) {
        if index == 0 || index > self.partitions.len() {
            warn!(
                partition = index,
                partition_count = self.partitions.len(),
                "dropping rows for out-of-range partition index"
            );
            return;
        }
        let slot = &mut self.partitions[index - 1];
        debug_assert!(slot.is_none(), "partition slot written twice");
        *slot = Some(rows);
    }

    pub(crate) fn set_state(&mut self, state: ExecutionState) {
        self.state = state;
    }

    /// The result metadata.
    pub fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }

    /// The state the execution finished in.
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Whether this result is empty because the execution timed out.
    pub fn timed_out(&self) -> bool {
        matches!(
            self.state,
            ExecutionState::TimedOut | ExecutionState::Cancelled
        )
    }

    /// Total rows as reported by the service.
    pub fn row_count(&self) -> u64 {
        self.metadata.row_count
    }

    /// Materialize every stored partition into typed rows.
    ///
    /// Partitions are concatenated in ascending index order. The method is
    /// read-only and idempotent: calling it again recomputes the same rows
    /// from the same stored raw data.
    pub fn materialize(&self) -> Vec<TypedRow> {
        let mut rows = Vec::with_capacity(self.metadata.row_count as usize);
        for partition in self.partitions.iter().flatten() {
            for raw_row in partition {
                rows.push(self.materialize_row(raw_row));
            }
        }
        rows
    }

    fn materialize_row(&self, raw_row: &[serde_json::Value]) -> TypedRow {
        let mut cells = IndexMap::with_capacity(self.metadata.columns.len());
        for (position, column) in self.metadata.columns.iter().enumerate() {
            let value = match raw_row.get(position) {
                Some(raw) => TypeCoercer::coerce(raw, &column.column_type),
                None => Value::Null,
            };
            cells.insert(column.name.clone(), value);
        }
        TypedRow::new(cells)
    }
}
