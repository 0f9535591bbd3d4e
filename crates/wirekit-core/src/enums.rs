//! Enumerations on the wire.
//!
//! An enum lists its members once in [`WireEnum::MEMBERS`]; a member may
//! carry an override name used on the wire instead of its symbolic name.
//! Flag enums additionally describe how to get at their bits and are
//! written as a delimited list of member names.

/// One member of a [`WireEnum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumMember<E> {
    pub value: E,
    pub name: &'static str,
    pub wire_name: Option<&'static str>,
}

impl<E> EnumMember<E> {
    pub const fn new(value: E, name: &'static str) -> Self {
        Self {
            value,
            name,
            wire_name: None,
        }
    }

    pub const fn renamed(value: E, name: &'static str, wire_name: &'static str) -> Self {
        Self {
            value,
            name,
            wire_name: Some(wire_name),
        }
    }

    /// The name written to the wire.
    pub fn serialized_name(&self) -> &'static str {
        self.wire_name.unwrap_or(self.name)
    }
}

/// Bit access for flag enums.
#[derive(Debug, Clone, Copy)]
pub struct FlagBits<E> {
    pub to_bits: fn(E) -> u64,
    pub from_bits: fn(u64) -> E,
}

pub trait WireEnum: Copy + PartialEq + 'static {
    const MEMBERS: &'static [EnumMember<Self>];

    /// `Some` for flag enums.
    const FLAGS: Option<FlagBits<Self>> = None;

    const FLAG_DELIMITER: char = ',';
}

/// Parses a single member or, for flag enums, a delimited combination.
///
/// Override names win over symbolic names; both compare case-insensitively.
/// Unknown values yield `None`.
pub fn parse_enum<E: WireEnum>(raw: &str) -> Option<E> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match E::FLAGS {
        Some(flags) => parse_flags(raw, flags),
        None => {
            let found = lookup::<E>(raw);
            if found.is_none() {
                tracing::debug!(
                    value = raw,
                    enum_type = std::any::type_name::<E>(),
                    "unknown enum value"
                );
            }
            found
        }
    }
}

fn lookup<E: WireEnum>(token: &str) -> Option<E> {
    E::MEMBERS
        .iter()
        .find(|m| m.wire_name.is_some_and(|w| w.eq_ignore_ascii_case(token)))
        .or_else(|| E::MEMBERS.iter().find(|m| m.name.eq_ignore_ascii_case(token)))
        .map(|m| m.value)
}

fn parse_flags<E: WireEnum>(raw: &str, flags: FlagBits<E>) -> Option<E> {
    let mut bits = 0u64;
    let mut recognized = false;
    for token in raw.split(E::FLAG_DELIMITER) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(member) = lookup::<E>(token) {
            bits |= (flags.to_bits)(member);
            recognized = true;
        } else if let Ok(raw_bits) = token.parse::<u64>() {
            bits |= raw_bits;
            recognized = true;
        } else {
            tracing::debug!(
                token,
                enum_type = std::any::type_name::<E>(),
                "skipping unknown flag"
            );
        }
    }
    recognized.then(|| (flags.from_bits)(bits))
}

/// Wire form of `value`; `None` when it matches no declared member.
pub fn serialize_enum<E: WireEnum>(value: E) -> Option<String> {
    match E::FLAGS {
        Some(flags) => serialize_flags(value, flags),
        None => E::MEMBERS
            .iter()
            .find(|m| m.value == value)
            .map(|m| m.serialized_name().to_owned()),
    }
}

fn serialize_flags<E: WireEnum>(value: E, flags: FlagBits<E>) -> Option<String> {
    let bits = (flags.to_bits)(value);
    if bits == 0 {
        return E::MEMBERS
            .iter()
            .find(|m| (flags.to_bits)(m.value) == 0)
            .map(|m| m.serialized_name().to_owned());
    }
    let mut covered = 0u64;
    let mut names = Vec::new();
    for member in E::MEMBERS {
        let member_bits = (flags.to_bits)(member.value);
        if member_bits == 0 || member_bits & bits != member_bits || member_bits & !covered == 0 {
            continue;
        }
        covered |= member_bits;
        names.push(member.serialized_name());
    }
    if names.is_empty() {
        return None;
    }
    if covered != bits {
        tracing::debug!(
            bits,
            covered,
            enum_type = std::any::type_name::<E>(),
            "flag value has undeclared bits"
        );
    }
    Some(names.join(&E::FLAG_DELIMITER.to_string()))
}
