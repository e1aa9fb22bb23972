use core::cell::Cell;

use lex_json::JsonNumber;

/// One parsed JSON value, allocated in the output arena.
#[derive(Debug)]
pub enum JsonValue<'a> {
    Null,
    Boolean(bool),
    Number(JsonNumber),
    /// `parse` mode: unescaped, NUL-terminated arena text.
    /// `scan` mode: a slice of the source with escapes intact.
    String(&'a str),
    Array(JsonArray<'a>),
    Object(JsonObject<'a>),
}

/// An array: element count and the head of a linked list of cells, in
/// source order.
#[derive(Debug)]
pub struct JsonArray<'a> {
    pub(crate) count: u32,
    pub(crate) head: Option<&'a ValueNode<'a>>,
}

/// An object: member count and the head of a linked list of named
/// cells, in source order.
#[derive(Debug)]
pub struct JsonObject<'a> {
    pub(crate) count: u32,
    pub(crate) head: Option<&'a NamedNode<'a>>,
}

/// An array cell.
#[derive(Debug)]
pub struct ValueNode<'a> {
    pub(crate) value: &'a JsonValue<'a>,
    pub(crate) next: Cell<Option<&'a ValueNode<'a>>>,
}

/// An object cell: member name plus value.
#[derive(Debug)]
pub struct NamedNode<'a> {
    pub(crate) name: &'a str,
    pub(crate) value: &'a JsonValue<'a>,
    pub(crate) next: Cell<Option<&'a NamedNode<'a>>>,
}

impl<'a> JsonValue<'a> {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            JsonValue::Number(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&JsonArray<'a>> {
        match self {
            JsonValue::Array(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&JsonObject<'a>> {
        match self {
            JsonValue::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl<'a> JsonArray<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates the elements in source order.
    #[must_use]
    pub fn iter(&self) -> ValueIter<'a> {
        ValueIter { node: self.head }
    }
}

impl<'a> JsonObject<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates the members in source order.
    #[must_use]
    pub fn iter(&self) -> MemberIter<'a> {
        MemberIter { node: self.head }
    }

    /// Linear lookup of the first member with the given name.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&'a JsonValue<'a>> {
        self.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }
}

impl<'a> IntoIterator for &JsonArray<'a> {
    type Item = &'a JsonValue<'a>;
    type IntoIter = ValueIter<'a>;

    fn into_iter(self) -> ValueIter<'a> {
        self.iter()
    }
}

impl<'a> IntoIterator for &JsonObject<'a> {
    type Item = (&'a str, &'a JsonValue<'a>);
    type IntoIter = MemberIter<'a>;

    fn into_iter(self) -> MemberIter<'a> {
        self.iter()
    }
}

/// Iterator over array elements.
#[derive(Debug, Clone, Copy)]
pub struct ValueIter<'a> {
    node: Option<&'a ValueNode<'a>>,
}

impl<'a> Iterator for ValueIter<'a> {
    type Item = &'a JsonValue<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.next.get();
        Some(node.value)
    }
}

/// Iterator over object members as `(name, value)` pairs.
#[derive(Debug, Clone, Copy)]
pub struct MemberIter<'a> {
    node: Option<&'a NamedNode<'a>>,
}

impl<'a> Iterator for MemberIter<'a> {
    type Item = (&'a str, &'a JsonValue<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.next.get();
        Some((node.name, node.value))
    }
}

// Structural equality, mostly for tests. Numbers compare by tag and
// payload, so `1` (integer) and `1.0` (float) are not equal.
impl PartialEq for JsonValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsonValue::Null, JsonValue::Null) => true,
            (JsonValue::Boolean(a), JsonValue::Boolean(b)) => a == b,
            (JsonValue::Number(a), JsonValue::Number(b)) => a == b,
            (JsonValue::String(a), JsonValue::String(b)) => a == b,
            (JsonValue::Array(a), JsonValue::Array(b)) => {
                a.count == b.count && a.iter().eq(b.iter())
            }
            (JsonValue::Object(a), JsonValue::Object(b)) => {
                a.count == b.count
                    && a.iter()
                        .zip(b.iter())
                        .all(|((an, av), (bn, bv))| an == bn && av == bv)
            }
            _ => false,
        }
    }
}
