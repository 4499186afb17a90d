//! Input validation for policy object fields
//!
//! Every validator here is a pure function over the raw text the user typed.
//! Malformed input never panics; it yields [`Validation::Invalid`] with a
//! message suitable for showing inline next to the field.

use std::fmt;
use std::net::Ipv4Addr;

/// Maximum length of an object, group or rule name accepted by the backend.
pub const MAX_NAME_LEN: usize = 63;

/// Maximum description length accepted for rules.
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Outcome of validating a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns the failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }

    /// Converts into the `Option<String>` shape used by form error structs.
    pub fn into_error(self) -> Option<String> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T, String>> for Validation {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(_) => Self::Valid,
            Err(reason) => Self::Invalid(reason),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Addresses
// ═══════════════════════════════════════════════════════════════════════════

/// A classified address token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpec {
    Any,
    SingleIp(Ipv4Addr),
    Cidr(ipnetwork::Ipv4Network),
    Range { start: Ipv4Addr, end: Ipv4Addr },
}

impl AddressSpec {
    /// First address covered, `None` for `any`
    pub fn first_ip(&self) -> Option<Ipv4Addr> {
        match self {
            Self::Any => None,
            Self::SingleIp(ip) => Some(*ip),
            Self::Cidr(net) => Some(net.ip()),
            Self::Range { start, .. } => Some(*start),
        }
    }
}

impl fmt::Display for AddressSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::SingleIp(ip) => write!(f, "{ip}"),
            Self::Cidr(net) => write!(f, "{}/{}", net.ip(), net.prefix()),
            Self::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

const ADDRESS_FORMATS: &str = "valid formats: 1.1.1.1, 1.1.1.1/24, 1.1.1.1-1.1.1.10";

/// Parses one dotted-quad: exactly four groups of 1-3 ASCII digits, each <= 255.
fn parse_octets(input: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut groups = input.split('.');

    for slot in &mut octets {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // 1-3 digits always fit in u16
        let value: u16 = group.parse().ok()?;
        *slot = u8::try_from(value).ok()?;
    }

    if groups.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

/// Classifies an address token.
///
/// Checks run in a fixed order: `any`, CIDR (`/`), range (`-`), plain IP.
/// A value containing both `/` and `-` is therefore judged as CIDR.
///
/// # Errors
///
/// Returns `Err` with a user-facing reason if the token fits none of the forms.
pub fn parse_address(input: &str) -> Result<AddressSpec, String> {
    if input.eq_ignore_ascii_case("any") {
        return Ok(AddressSpec::Any);
    }

    if input.contains('/') {
        let parts: Vec<&str> = input.split('/').collect();
        let [ip_part, prefix_part] = parts.as_slice() else {
            return Err(format!("Invalid CIDR notation ({ADDRESS_FORMATS})"));
        };

        let prefix = if !prefix_part.is_empty() && prefix_part.bytes().all(|b| b.is_ascii_digit())
        {
            prefix_part.parse::<u8>().ok().filter(|p| *p <= 32)
        } else {
            None
        };
        let Some(prefix) = prefix else {
            return Err("Prefix length must be between 0 and 32".to_string());
        };

        let ip = parse_octets(ip_part)
            .ok_or_else(|| format!("Invalid IP address ({ADDRESS_FORMATS})"))?;

        return ipnetwork::Ipv4Network::new(ip, prefix)
            .map(AddressSpec::Cidr)
            .map_err(|e| e.to_string());
    }

    if input.contains('-') {
        let parts: Vec<&str> = input.split('-').collect();
        let [start, end] = parts.as_slice() else {
            return Err(format!("Invalid IP range ({ADDRESS_FORMATS})"));
        };

        return match (parse_octets(start), parse_octets(end)) {
            (Some(start), Some(end)) => Ok(AddressSpec::Range { start, end }),
            _ => Err(format!("Invalid IP range ({ADDRESS_FORMATS})")),
        };
    }

    parse_octets(input)
        .map(AddressSpec::SingleIp)
        .ok_or_else(|| format!("Invalid IP address ({ADDRESS_FORMATS})"))
}

/// Validates an address token (`any`, IP, CIDR or range).
///
/// ```
/// use panctl::validators::validate_address;
///
/// assert!(validate_address("ANY").is_valid());
/// assert!(validate_address("10.0.0.1/24").is_valid());
/// assert!(!validate_address("10.0.0.1/33").is_valid());
/// ```
pub fn validate_address(input: &str) -> Validation {
    parse_address(input).into()
}

// ═══════════════════════════════════════════════════════════════════════════
// Ports
// ═══════════════════════════════════════════════════════════════════════════

/// A classified port token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    Range { start: u16, end: u16 },
    List(Vec<u16>),
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(port) => write!(f, "{port}"),
            Self::Range { start, end } => write!(f, "{start}-{end}"),
            Self::List(ports) => {
                let joined: Vec<String> = ports.iter().map(u16::to_string).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

/// Parses a port number in 1..=65535. Anything else, including nested ranges, fails.
fn parse_port_number(token: &str) -> Option<u16> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u16>().ok().filter(|p| *p != 0)
}

/// Classifies a port token.
///
/// Precedence is fixed: comma list, then range, then single value. Tokens of a
/// list are never re-interpreted as ranges, so `80,1000-2000` fails.
///
/// # Errors
///
/// Returns `Err` with a user-facing reason when the token is empty or malformed.
pub fn parse_port(input: &str) -> Result<PortSpec, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Port is required".to_string());
    }

    if input.contains(',') {
        return input
            .split(',')
            .map(|token| parse_port_number(token.trim()))
            .collect::<Option<Vec<u16>>>()
            .map(PortSpec::List)
            .ok_or_else(|| "All ports must be between 1-65535".to_string());
    }

    if input.contains('-') {
        let parts: Vec<&str> = input.split('-').map(str::trim).collect();
        if let [start, end] = parts.as_slice()
            && let (Some(start), Some(end)) = (parse_port_number(start), parse_port_number(end))
            && start <= end
        {
            return Ok(PortSpec::Range { start, end });
        }
        return Err("Invalid port range (1-65535)".to_string());
    }

    parse_port_number(input)
        .map(PortSpec::Single)
        .ok_or_else(|| "Port must be between 1-65535".to_string())
}

/// Validates a port token (single, range or comma list).
///
/// ```
/// use panctl::validators::{validate_port, Validation};
///
/// assert!(validate_port("80,443,8080").is_valid());
/// assert_eq!(validate_port(""), Validation::Invalid("Port is required".into()));
/// ```
pub fn validate_port(input: &str) -> Validation {
    parse_port(input).into()
}

// ═══════════════════════════════════════════════════════════════════════════
// Names
// ═══════════════════════════════════════════════════════════════════════════

/// What a name belongs to; only changes the "required" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Generic,
    Object,
    Group,
    Rule,
}

impl NameKind {
    fn required_message(self) -> &'static str {
        match self {
            Self::Generic => "Name is required",
            Self::Object => "Object name is required.",
            Self::Group => "Group name is required.",
            Self::Rule => "Rule name is required",
        }
    }
}

/// Validates an object/group/rule name.
///
/// Checks run in order and stop at the first failure:
/// missing, too long, disallowed characters, leading digit.
pub fn validate_name(input: &str) -> Validation {
    validate_entity_name(NameKind::Generic, input)
}

/// Same as [`validate_name`] with a kind-specific "required" message.
pub fn validate_entity_name(kind: NameKind, input: &str) -> Validation {
    if input.is_empty() {
        return Validation::Invalid(kind.required_message().to_string());
    }

    if input.chars().count() > MAX_NAME_LEN {
        return Validation::Invalid(format!("Name must be {MAX_NAME_LEN} characters or less"));
    }

    if !input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Validation::Invalid(
            "Only letters, numbers, hyphens, underscores and periods allowed".to_string(),
        );
    }

    if input.starts_with(|c: char| c.is_ascii_digit()) {
        return Validation::Invalid("Name cannot start with a number".to_string());
    }

    Validation::Valid
}

/// Validates a free-text description.
pub fn validate_description(input: &str) -> Validation {
    if input.chars().count() > MAX_DESCRIPTION_LEN {
        Validation::Invalid(format!(
            "Description too long (max {MAX_DESCRIPTION_LEN} chars)"
        ))
    } else {
        Validation::Valid
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Helpers for prefilling create forms
// ═══════════════════════════════════════════════════════════════════════════

/// Guesses the backend address type for a raw value.
pub fn detect_address_type(value: &str) -> crate::core::objects::AddressType {
    use crate::core::objects::AddressType;

    if value.is_empty() {
        return AddressType::IpNetmask;
    }
    if value.contains('-') {
        return AddressType::IpRange;
    }
    if let Some((_, mask)) = value.split_once('/')
        && mask.contains('.')
    {
        return AddressType::IpWildcard;
    }
    if value.chars().any(|c| c.is_ascii_alphabetic()) {
        return AddressType::Fqdn;
    }
    AddressType::IpNetmask
}

/// Derives a legal-looking object name from a value, e.g. `10.0.0.0/24` → `10_0_0_0_24`.
///
/// The result may still start with a digit; it is a suggestion the user edits.
pub fn suggest_object_name(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    replaced.trim_matches('_').to_string()
}

/// `TCP_8080` style name for a protocol/port pair, non-alphanumerics as `_`.
pub fn suggest_service_name(protocol: &str, port: &str) -> String {
    format!("{}-{port}", protocol.to_uppercase())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Name fields turn each run of whitespace into a single `_` as the user types.
pub fn underscore_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_space = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Splits a comma-separated tag field, dropping blanks.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Checks if an address is in a reserved range and returns an informational hint.
///
/// Informational only; never blocks submission.
pub fn check_reserved_ip(spec: &AddressSpec) -> Option<String> {
    let octets = spec.first_ip()?.octets();

    // RFC 1918 private ranges
    if octets[0] == 10
        || (octets[0] == 172 && (16..=31).contains(&octets[1]))
        || (octets[0] == 192 && octets[1] == 168)
    {
        return Some("Private IP range (RFC 1918)".to_string());
    }

    if octets[0] == 127 {
        return Some("Loopback range (127.x)".to_string());
    }

    if octets[0] == 169 && octets[1] == 254 {
        return Some("Link-local range (169.254.x.x)".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::objects::AddressType;

    #[test]
    fn test_address_any_is_case_insensitive() {
        assert!(validate_address("any").is_valid());
        assert!(validate_address("ANY").is_valid());
        assert!(validate_address("Any").is_valid());
    }

    #[test]
    fn test_address_cidr() {
        assert!(validate_address("10.0.0.1/24").is_valid());
        assert!(validate_address("0.0.0.0/0").is_valid());
        assert!(validate_address("10.0.0.1/32").is_valid());
        assert!(!validate_address("10.0.0.1/33").is_valid());
        assert!(!validate_address("10.0.0.1/").is_valid());
        assert!(!validate_address("10.0.0.1/2/4").is_valid());
        assert!(!validate_address("10.0.0/24").is_valid());
        assert!(!validate_address("10.0.0.256/24").is_valid());
    }

    #[test]
    fn test_address_cidr_keeps_host_bits() {
        let spec = parse_address("10.0.0.1/24").unwrap();
        assert_eq!(spec.to_string(), "10.0.0.1/24");
    }

    #[test]
    fn test_address_range() {
        assert!(validate_address("10.0.0.1-10.0.0.5").is_valid());
        assert!(!validate_address("10.0.0.1-999.0.0.5").is_valid());
        assert!(!validate_address("10.0.0.1-10.0.0.5-10.0.0.9").is_valid());
        assert!(!validate_address("10.0.0.1-").is_valid());
    }

    #[test]
    fn test_address_single() {
        assert!(validate_address("192.168.1.1").is_valid());
        assert!(!validate_address("10.0.0.999").is_valid());
        assert!(!validate_address("10.0.0").is_valid());
        assert!(!validate_address("10.0.0.1.1").is_valid());
        assert!(!validate_address("0010.0.0.1").is_valid());
        assert!(!validate_address("").is_valid());
        assert!(!validate_address("host.example.com").is_valid());
    }

    #[test]
    fn test_address_cidr_checked_before_range() {
        // Contains both separators: judged as CIDR, whose IP part is not a dotted quad
        let result = parse_address("10.0.0.1-10.0.0.5/24");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid IP address"));

        // Prefix check comes first within CIDR
        let result = parse_address("10.0.0.1-10.0.0.5/40");
        assert_eq!(result.unwrap_err(), "Prefix length must be between 0 and 32");
    }

    #[test]
    fn test_port_list() {
        assert!(validate_port("80,443,8080").is_valid());
        assert!(validate_port("80, 443").is_valid());
        assert!(!validate_port("80,70000").is_valid());
        assert!(!validate_port("80,").is_valid());
        assert_eq!(
            parse_port("22, 80 ,443").unwrap(),
            PortSpec::List(vec![22, 80, 443])
        );
    }

    #[test]
    fn test_port_list_has_no_nested_ranges() {
        assert_eq!(
            validate_port("80,1000-2000"),
            Validation::Invalid("All ports must be between 1-65535".to_string())
        );
    }

    #[test]
    fn test_port_range() {
        assert!(validate_port("1000-2000").is_valid());
        assert!(validate_port("80-80").is_valid());
        assert!(!validate_port("2000-1000").is_valid());
        assert!(!validate_port("0-100").is_valid());
        assert!(!validate_port("1-65536").is_valid());
        assert!(!validate_port("1-2-3").is_valid());
        assert!(!validate_port("a-b").is_valid());
    }

    #[test]
    fn test_port_single() {
        assert!(validate_port("1").is_valid());
        assert!(validate_port("65535").is_valid());
        assert!(!validate_port("0").is_valid());
        assert!(!validate_port("65536").is_valid());
        assert!(!validate_port("80.5").is_valid());
        assert!(!validate_port("http").is_valid());
    }

    #[test]
    fn test_port_required() {
        assert_eq!(
            validate_port(""),
            Validation::Invalid("Port is required".to_string())
        );
        assert_eq!(
            validate_port("   "),
            Validation::Invalid("Port is required".to_string())
        );
    }

    #[test]
    fn test_name_rules_in_order() {
        assert_eq!(
            validate_name(""),
            Validation::Invalid("Name is required".to_string())
        );
        assert_eq!(
            validate_name(&"a".repeat(64)),
            Validation::Invalid("Name must be 63 characters or less".to_string())
        );
        // Too long wins over bad characters
        assert!(
            validate_name(&"$".repeat(64))
                .reason()
                .unwrap()
                .contains("63 characters")
        );
        assert!(
            validate_name("web server")
                .reason()
                .unwrap()
                .contains("Only letters")
        );
        // Bad characters win over leading digit
        assert!(validate_name("1 a").reason().unwrap().contains("Only letters"));
        assert_eq!(
            validate_name("1abc"),
            Validation::Invalid("Name cannot start with a number".to_string())
        );
    }

    #[test]
    fn test_name_valid() {
        assert!(validate_name("Web-Server_01").is_valid());
        assert!(validate_name("a").is_valid());
        assert!(validate_name(&"a".repeat(63)).is_valid());
        assert!(validate_name("host.example").is_valid());
    }

    #[test]
    fn test_entity_name_required_messages() {
        assert_eq!(
            validate_entity_name(NameKind::Group, "").reason(),
            Some("Group name is required.")
        );
        assert_eq!(
            validate_entity_name(NameKind::Rule, "").reason(),
            Some("Rule name is required")
        );
    }

    #[test]
    fn test_description_length() {
        assert!(validate_description("").is_valid());
        assert!(validate_description(&"x".repeat(1024)).is_valid());
        assert!(!validate_description(&"x".repeat(1025)).is_valid());
    }

    #[test]
    fn test_detect_address_type() {
        assert_eq!(detect_address_type(""), AddressType::IpNetmask);
        assert_eq!(detect_address_type("10.0.0.0/24"), AddressType::IpNetmask);
        assert_eq!(detect_address_type("10.0.0.1-10.0.0.9"), AddressType::IpRange);
        assert_eq!(
            detect_address_type("10.0.0.0/0.0.255.255"),
            AddressType::IpWildcard
        );
        assert_eq!(detect_address_type("www.example.com"), AddressType::Fqdn);
    }

    #[test]
    fn test_suggest_object_name() {
        assert_eq!(suggest_object_name("10.0.0.0/24"), "10_0_0_0_24");
        assert_eq!(suggest_object_name("/host.local/"), "host_local");
    }

    #[test]
    fn test_suggest_service_name() {
        assert_eq!(suggest_service_name("tcp", "8080"), "TCP_8080");
        assert_eq!(suggest_service_name("udp", "5000-5010"), "UDP_5000_5010");
    }

    #[test]
    fn test_underscore_whitespace() {
        assert_eq!(underscore_whitespace("web  servers\tprod"), "web_servers_prod");
        assert_eq!(underscore_whitespace("plain"), "plain");
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" web, ,prod ,"), vec!["web", "prod"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_check_reserved_ip() {
        let private = parse_address("192.168.1.0/24").unwrap();
        assert!(check_reserved_ip(&private).unwrap().contains("RFC 1918"));

        let loopback = parse_address("127.0.0.1").unwrap();
        assert!(check_reserved_ip(&loopback).unwrap().contains("Loopback"));

        let link_local = parse_address("169.254.0.1-169.254.0.9").unwrap();
        assert!(check_reserved_ip(&link_local).unwrap().contains("Link-local"));

        assert!(check_reserved_ip(&parse_address("8.8.8.8").unwrap()).is_none());
        assert!(check_reserved_ip(&AddressSpec::Any).is_none());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_validators_are_idempotent(input in "\\PC{0,40}") {
            prop_assert_eq!(validate_address(&input), validate_address(&input));
            prop_assert_eq!(validate_port(&input), validate_port(&input));
            prop_assert_eq!(validate_name(&input), validate_name(&input));
        }

        #[test]
        fn test_dotted_quads_in_range_are_valid(a in 0u8..=255, b in 0u8..=255, c in 0u8..=255, d in 0u8..=255) {
            let ip = format!("{a}.{b}.{c}.{d}");
            prop_assert!(validate_address(&ip).is_valid());
        }

        #[test]
        fn test_cidr_prefix_bound(prefix in 0u32..=64) {
            let cidr = format!("10.1.2.3/{prefix}");
            prop_assert_eq!(validate_address(&cidr).is_valid(), prefix <= 32);
        }

        #[test]
        fn test_port_range_consistency(start in 1u16..=65535, end in 1u16..=65535) {
            let result = validate_port(&format!("{start}-{end}"));
            prop_assert_eq!(result.is_valid(), start <= end);
        }

        #[test]
        fn test_single_port_bounds(port in 0u32..=70000) {
            let result = validate_port(&port.to_string());
            prop_assert_eq!(result.is_valid(), (1..=65535).contains(&port));
        }

        #[test]
        fn test_name_charset(name in "[a-zA-Z][a-zA-Z0-9._-]{0,62}") {
            prop_assert!(validate_name(&name).is_valid());
        }

        #[test]
        fn test_name_rejects_leading_digit(digit in "[0-9]", rest in "[a-zA-Z0-9._-]{0,30}") {
            let name = format!("{digit}{rest}");
            prop_assert_eq!(
                validate_name(&name),
                Validation::Invalid("Name cannot start with a number".to_string())
            );
        }
    }
}
