//! Typed selection and ordering expressions.
//!
//! `Query` and `SortSpec` are the only shapes a collection backend accepts.
//! The MongoDB backend lowers them into filter/sort documents; the in-memory
//! backend evaluates them directly with the same matching rules.

use std::cmp::Ordering;

use bson::{Bson, Document, oid::ObjectId};

/// Name of the store-assigned identity field.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Matches every document in the collection.
    All,
    /// Matches the document with the given identity.
    Id(ObjectId),
    /// Field equality. An array field matches when any element equals the value.
    Eq(String, Bson),
    /// Conjunction of clauses; an empty list behaves like `All`.
    AllOf(Vec<Query>),
}

impl Query {
    pub fn by_id(id: ObjectId) -> Self {
        Self::Id(id)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// Adds a clause, flattening into a single conjunction.
    pub fn and(self, other: Query) -> Self {
        match (self, other) {
            (Self::All, other) => other,
            (this, Self::All) => this,
            (Self::AllOf(mut clauses), Self::AllOf(more)) => {
                clauses.extend(more);
                Self::AllOf(clauses)
            }
            (Self::AllOf(mut clauses), other) => {
                clauses.push(other);
                Self::AllOf(clauses)
            }
            (this, Self::AllOf(mut clauses)) => {
                clauses.insert(0, this);
                Self::AllOf(clauses)
            }
            (this, other) => Self::AllOf(vec![this, other]),
        }
    }

    /// Lowers the query into a MongoDB filter document.
    pub fn to_filter(&self) -> Document {
        match self {
            Self::All => Document::new(),
            Self::Id(id) => {
                let mut filter = Document::new();
                filter.insert(ID_FIELD, *id);
                filter
            }
            Self::Eq(field, value) => {
                let mut filter = Document::new();
                filter.insert(field.clone(), value.clone());
                filter
            }
            Self::AllOf(clauses) if clauses.is_empty() => Document::new(),
            Self::AllOf(clauses) => {
                let lowered = clauses
                    .iter()
                    .map(|clause| Bson::Document(clause.to_filter()))
                    .collect::<Vec<_>>();
                let mut filter = Document::new();
                filter.insert("$and", lowered);
                filter
            }
        }
    }

    /// Evaluates the query against a single document.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => matches!(document.get(ID_FIELD), Some(Bson::ObjectId(stored)) if stored == id),
            Self::Eq(field, expected) => field_matches(document.get(field), expected),
            Self::AllOf(clauses) => clauses.iter().all(|clause| clause.matches(document)),
        }
    }
}

fn field_matches(actual: Option<&Bson>, expected: &Bson) -> bool {
    match actual {
        None => matches!(expected, Bson::Null),
        Some(value @ Bson::Array(items)) => {
            value == expected || items.iter().any(|item| bson_eq(item, expected))
        }
        Some(value) => bson_eq(value, expected),
    }
}

fn bson_eq(left: &Bson, right: &Bson) -> bool {
    match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left == right,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_mongo(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered list of sort keys. The default sorts by identity, ascending,
/// which is also insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::by(ID_FIELD, SortDirection::Ascending)
    }
}

impl SortSpec {
    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            keys: vec![SortKey {
                field: field.into(),
                direction,
            }],
        }
    }

    pub fn then_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        let field = field.into();
        if !self.keys.iter().any(|key| key.field == field) {
            self.keys.push(SortKey { field, direction });
        }
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn to_document(&self) -> Document {
        let mut sort = Document::new();
        for key in &self.keys {
            sort.insert(key.field.clone(), key.direction.as_mongo());
        }
        sort
    }

    /// Compares two documents using the configured keys.
    pub fn compare(&self, left: &Document, right: &Document) -> Ordering {
        self.keys.iter().fold(Ordering::Equal, |ordering, key| {
            ordering.then_with(|| {
                let ordering = compare_bson(left.get(&key.field), right.get(&key.field));
                match key.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            })
        })
    }
}

// Cross-type ordering follows the document store's canonical type order.
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 1,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 2,
        Some(Bson::String(_)) | Some(Bson::Symbol(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::Binary(_)) => 6,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(Bson::Timestamp(_)) => 10,
        Some(_) => 11,
    }
}

fn compare_bson(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let rank = type_rank(left).cmp(&type_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }

    match (left, right) {
        (Some(l), Some(r)) if as_number(l).is_some() => {
            let (l, r) = (as_number(l).unwrap_or_default(), as_number(r).unwrap_or_default());
            l.partial_cmp(&r).unwrap_or(Ordering::Equal)
        }
        (Some(Bson::String(l)), Some(Bson::String(r))) => l.cmp(r),
        (Some(Bson::ObjectId(l)), Some(Bson::ObjectId(r))) => l.bytes().cmp(&r.bytes()),
        (Some(Bson::Boolean(l)), Some(Bson::Boolean(r))) => l.cmp(r),
        (Some(Bson::DateTime(l)), Some(Bson::DateTime(r))) => l.cmp(r),
        (Some(Bson::Timestamp(l)), Some(Bson::Timestamp(r))) => {
            (l.time, l.increment).cmp(&(r.time, r.increment))
        }
        (Some(Bson::Array(l)), Some(Bson::Array(r))) => {
            for (a, b) in l.iter().zip(r.iter()) {
                let ordering = compare_bson(Some(a), Some(b));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            l.len().cmp(&r.len())
        }
        _ => Ordering::Equal,
    }
}
