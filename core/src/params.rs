//! Projection of typed requests onto YOURLS query parameters.
//!
//! # Design
//! Every request type lists its fields once, in declaration order, through
//! `FormFields`. Each field carries the wire name it is sent under and a
//! `FormValue` describing its kind. The omission rules live in
//! `FormValue::render`: empty text and zero integers are treated as absent,
//! and kinds the API has no encoding for are dropped without complaint.

use url::form_urlencoded;

/// The value of one request field, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormValue<'a> {
    Text(&'a str),
    Signed(i64),
    Unsigned(u64),
    /// Booleans, nested records and anything else without a query encoding.
    Unsupported,
}

impl FormValue<'_> {
    /// Wire representation, or `None` when the field must be left out.
    pub fn render(&self) -> Option<String> {
        match *self {
            FormValue::Text(s) if !s.is_empty() => Some(s.to_string()),
            FormValue::Signed(n) if n != 0 => Some(n.to_string()),
            FormValue::Unsigned(n) if n != 0 => Some(n.to_string()),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for FormValue<'a> {
    fn from(value: &'a str) -> Self {
        FormValue::Text(value)
    }
}

impl<'a> From<&'a String> for FormValue<'a> {
    fn from(value: &'a String) -> Self {
        FormValue::Text(value)
    }
}

impl<'a, T> From<Option<T>> for FormValue<'a>
where
    T: Into<FormValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(FormValue::Text(""), Into::into)
    }
}

impl From<bool> for FormValue<'_> {
    fn from(_: bool) -> Self {
        FormValue::Unsupported
    }
}

macro_rules! signed_form_value {
    ($($t:ty),*) => {$(
        impl From<$t> for FormValue<'_> {
            fn from(value: $t) -> Self {
                FormValue::Signed(i64::from(value))
            }
        }
    )*};
}

macro_rules! unsigned_form_value {
    ($($t:ty),*) => {$(
        impl From<$t> for FormValue<'_> {
            fn from(value: $t) -> Self {
                FormValue::Unsigned(u64::from(value))
            }
        }
    )*};
}

signed_form_value!(i8, i16, i32, i64);
unsigned_form_value!(u8, u16, u32, u64);

impl From<isize> for FormValue<'_> {
    fn from(value: isize) -> Self {
        FormValue::Signed(value as i64)
    }
}

impl From<usize> for FormValue<'_> {
    fn from(value: usize) -> Self {
        FormValue::Unsigned(value as u64)
    }
}

/// One declared field: wire name plus value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField<'a> {
    pub key: &'a str,
    pub value: FormValue<'a>,
}

impl<'a> FormField<'a> {
    pub fn new(key: &'a str, value: impl Into<FormValue<'a>>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// A record that can be sent as YOURLS query parameters.
pub trait FormFields {
    /// Fields in declaration order.
    fn form_fields(&self) -> Vec<FormField<'_>>;
}

impl<T: FormFields + ?Sized> FormFields for &T {
    fn form_fields(&self) -> Vec<FormField<'_>> {
        (**self).form_fields()
    }
}

/// Render `record` into ordered key/value pairs, applying the omission rules.
pub fn to_params<F: FormFields + ?Sized>(record: &F) -> Vec<(String, String)> {
    record
        .form_fields()
        .into_iter()
        .filter_map(|field| field.value.render().map(|v| (field.key.to_string(), v)))
        .collect()
}

/// `application/x-www-form-urlencoded` serialization of `params`.
pub fn encode_query(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}
