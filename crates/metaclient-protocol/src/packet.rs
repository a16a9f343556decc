//! Packets: an owned list of string fields plus a typed reader over them.

use std::str::FromStr;

use crate::codec::{decode_bool, encode_frame};
use crate::{Command, ProtocolError};

/// One protocol packet: an ordered list of string fields.
///
/// By convention the first field is the command name. Outgoing packets are
/// built with [`Packet::new`] and [`Packet::arg`]; incoming packets come out
/// of the [`Deserializer`](crate::Deserializer) and are read with
/// [`Packet::reader`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Packet {
    fields: Vec<String>,
}

impl Packet {
    /// Starts a packet for `command`.
    pub fn new(command: Command) -> Self {
        Self {
            fields: vec![command.as_str().to_owned()],
        }
    }

    /// Wraps already-decoded fields.
    pub fn from_fields(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Appends a field, builder style.
    pub fn arg(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// All fields, command name included.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The command name, if the packet has any fields at all.
    pub fn command_name(&self) -> Option<&str> {
        self.fields.first().map(String::as_str)
    }

    /// Encodes the packet into a wire frame.
    ///
    /// # Errors
    /// See [`encode_frame`].
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_frame(&self.fields)
    }

    /// Returns a cursor positioned at the first field.
    pub fn reader(&self) -> FieldReader<'_> {
        FieldReader {
            fields: &self.fields,
            pos: 0,
        }
    }
}

/// A forward-only cursor over a packet's fields.
///
/// Every accessor takes the name of the field being read so that a short
/// or garbled packet produces an error that says *what* was missing.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    fields: &'a [String],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Reads the next field as a string.
    ///
    /// # Errors
    /// [`ProtocolError::MissingField`] if the packet has no more fields.
    pub fn string(&mut self, name: &'static str) -> Result<&'a str, ProtocolError> {
        self.optional().ok_or(ProtocolError::MissingField(name))
    }

    /// Reads the next field if there is one.
    pub fn optional(&mut self) -> Option<&'a str> {
        let field = self.fields.get(self.pos)?;
        self.pos += 1;
        Some(field.as_str())
    }

    /// Reads the next field as a wire boolean.
    ///
    /// # Errors
    /// [`ProtocolError::MissingField`] or [`ProtocolError::InvalidBool`].
    pub fn bool(&mut self, name: &'static str) -> Result<bool, ProtocolError> {
        decode_bool(self.string(name)?)
    }

    /// Reads the next field as a number.
    ///
    /// # Errors
    /// [`ProtocolError::MissingField`] or [`ProtocolError::InvalidNumber`].
    pub fn number<T: FromStr>(&mut self, name: &'static str) -> Result<T, ProtocolError> {
        let raw = self.string(name)?;
        raw.trim().parse().map_err(|_| ProtocolError::InvalidNumber {
            field: name,
            value: raw.to_owned(),
        })
    }

    /// Number of fields not yet read.
    pub fn remaining(&self) -> usize {
        self.fields.len().saturating_sub(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_puts_command_first() {
        let packet = Packet::new(Command::GameOpen).arg("my game").arg("1024");

        assert_eq!(packet.command_name(), Some("GAME_OPEN"));
        assert_eq!(packet.fields(), ["GAME_OPEN", "my game", "1024"]);
    }

    #[test]
    fn test_reader_reads_typed_fields_in_order() {
        let packet = Packet::from_fields(vec![
            "GAMES".into(),
            "1".into(),
            "Arena".into(),
            "true".into(),
        ]);
        let mut r = packet.reader();

        assert_eq!(r.string("command").unwrap(), "GAMES");
        assert_eq!(r.number::<usize>("count").unwrap(), 1);
        assert_eq!(r.string("name").unwrap(), "Arena");
        assert!(r.bool("connectable").unwrap());
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_reader_missing_field_names_the_field() {
        let packet = Packet::new(Command::Time);
        let mut r = packet.reader();
        r.string("command").unwrap();

        let result = r.string("server time");

        assert!(matches!(result, Err(ProtocolError::MissingField("server time"))));
    }

    #[test]
    fn test_reader_invalid_number_keeps_raw_value() {
        let packet = Packet::from_fields(vec!["soon".into()]);
        let result = packet.reader().number::<i64>("server time");

        assert!(matches!(
            result,
            Err(ProtocolError::InvalidNumber { field: "server time", value }) if value == "soon"
        ));
    }

    #[test]
    fn test_reader_optional_returns_none_at_end() {
        let packet = Packet::default();
        assert_eq!(packet.reader().optional(), None);
        assert_eq!(packet.command_name(), None);
    }
}
