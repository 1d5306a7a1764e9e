#![forbid(unsafe_code)]

use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A runtime value. Composites sit behind `Rc<RefCell<_>>` so that field
/// and index assignment through an alias is visible to every holder.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<IndexMap<MapKey, Value>>>),
    Record(Rc<RefCell<RecordInstance>>),
}

#[derive(Debug)]
pub struct RecordInstance {
    pub name: String,
    pub fields: IndexMap<String, Value>,
    pub immutable_fields: HashSet<String>,
}

/// The hashable scalar subset of values usable as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Null,
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn map(entries: IndexMap<MapKey, Value>) -> Value {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn record(instance: RecordInstance) -> Value {
        Value::Record(Rc::new(RefCell::new(instance)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_map_key(&self) -> Option<MapKey> {
        match self {
            Value::Null => Some(MapKey::Null),
            Value::Int(v) => Some(MapKey::Int(*v)),
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            Value::Str(s) => Some(MapKey::Str(s.clone())),
            Value::Array(_) | Value::Map(_) | Value::Record(_) => None,
        }
    }
}

// scalars compare by value, composites by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Array(l), Value::Array(r)) => Rc::ptr_eq(l, r),
            (Value::Map(l), Value::Map(r)) => Rc::ptr_eq(l, r),
            (Value::Record(l), Value::Record(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Record(instance) => {
                let instance = instance.borrow();
                write!(f, "{}{{", instance.name)?;
                for (i, (name, value)) in instance.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Null => write!(f, "null"),
            MapKey::Int(v) => write!(f, "{v}"),
            MapKey::Bool(b) => write!(f, "{b}"),
            MapKey::Str(s) => write!(f, "{s}"),
        }
    }
}
