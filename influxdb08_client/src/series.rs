//! Row oriented points and the columnar series format used on the wire.
//!
//! Writes and query results both travel as [`SeriesPayload`]s:
//!
//! ```json
//! {"name": "temps", "columns": ["a", "b"], "points": [[1, 2], [null, 3]]}
//! ```
//!
//! [`encode`] turns a batch of [`Point`]s into that shape and [`denormalize`]
//! turns it back into points.
use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::DecodingError;

/// Points of a query result keyed by series name, in the order the server
/// returned the series
pub type QueryResult = IndexMap<String, Vec<Point>>;

/// A single scalar column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value; written for columns a point does not have
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(other: bool) -> Self {
        Self::Bool(other)
    }
}

impl From<i32> for FieldValue {
    fn from(other: i32) -> Self {
        Self::I64(other.into())
    }
}

impl From<i64> for FieldValue {
    fn from(other: i64) -> Self {
        Self::I64(other)
    }
}

impl From<u64> for FieldValue {
    fn from(other: u64) -> Self {
        Self::U64(other)
    }
}

impl From<f64> for FieldValue {
    fn from(other: f64) -> Self {
        Self::F64(other)
    }
}

impl From<&str> for FieldValue {
    fn from(other: &str) -> Self {
        Self::String(other.into())
    }
}

impl From<String> for FieldValue {
    fn from(other: String) -> Self {
        Self::String(other)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(other: Option<T>) -> Self {
        other.map_or(Self::Null, Into::into)
    }
}

/// One row: column name to value.
///
/// # Example
/// ```
/// # use influxdb08_client::{FieldValue, Point};
/// let point = Point::new().with("host", "server01").with("value", 0.64);
/// assert_eq!(point.get("value"), Some(&FieldValue::F64(0.64)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Point(BTreeMap<String, FieldValue>);

impl Point {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column`, replacing any existing value of the same name
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(
        &mut self,
        column: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.0.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        self.0.remove(column)
    }

    /// Column names in ascending order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Point
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Point
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// The points of one series that are encoded together.
///
/// A lone [`Point`] converts into a batch of one, so every API taking
/// `impl Into<PointBatch>` accepts a single point as well as many.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBatch(Vec<Point>);

impl PointBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.0.iter()
    }
}

impl From<Point> for PointBatch {
    fn from(point: Point) -> Self {
        Self(vec![point])
    }
}

impl From<Vec<Point>> for PointBatch {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl From<&[Point]> for PointBatch {
    fn from(points: &[Point]) -> Self {
        Self(points.to_vec())
    }
}

impl<const N: usize> From<[Point; N]> for PointBatch {
    fn from(points: [Point; N]) -> Self {
        Self(points.into())
    }
}

impl FromIterator<Point> for PointBatch {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PointBatch {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Columnar representation of a series, as sent to and returned by the server.
///
/// Every row in `points` lines up positionally with `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    pub name: String,
    pub columns: Vec<String>,
    pub points: Vec<Vec<FieldValue>>,
}

/// Encode a batch of points for the series `name`.
///
/// The columns are the union of every point's keys, sorted ascending, so the
/// output does not depend on the order keys were inserted. A point without a
/// given column gets [`FieldValue::Null`] in that slot.
///
/// # Example
/// ```
/// # use influxdb08_client::{Point, series::encode};
/// let payload = encode(
///     "temps",
///     vec![Point::from([("a", 1), ("b", 2)]), Point::from([("b", 3)])],
/// );
/// assert_eq!(
///     serde_json::to_string(&payload).unwrap(),
///     r#"{"name":"temps","columns":["a","b"],"points":[[1,2],[null,3]]}"#,
/// );
/// ```
pub fn encode(name: impl Into<String>, batch: impl Into<PointBatch>) -> SeriesPayload {
    let batch = batch.into();

    let columns: Vec<String> = batch
        .iter()
        .flat_map(Point::columns)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect();

    let points = batch
        .into_iter()
        .map(|mut point| {
            columns
                .iter()
                .map(|column| point.remove(column).unwrap_or(FieldValue::Null))
                .collect()
        })
        .collect();

    SeriesPayload {
        name: name.into(),
        columns,
        points,
    }
}

/// Rebuild the points of a series payload, keeping the row order.
///
/// A row with a different number of values than there are columns is a
/// malformed response and fails with [`DecodingError::RowLength`].
pub fn denormalize(payload: SeriesPayload) -> Result<Vec<Point>, DecodingError> {
    let SeriesPayload {
        name,
        columns,
        points,
    } = payload;

    points
        .into_iter()
        .enumerate()
        .map(|(row, values)| {
            if values.len() != columns.len() {
                return Err(DecodingError::RowLength {
                    series: name.clone(),
                    row,
                    expected: columns.len(),
                    actual: values.len(),
                });
            }
            Ok(Point(columns.iter().cloned().zip(values).collect()))
        })
        .collect()
}
