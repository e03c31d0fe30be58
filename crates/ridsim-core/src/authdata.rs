//! Flight-authorisation fixture data: UAS serial numbers (ANSI/CTA-2063-A)
//! and operator registration numbers (EN4709-02), both in valid and
//! deliberately corrupted form, plus operator flight details paired with
//! replayed telemetry.

use geo::Coord;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// CTA-2063-A code points: digits and uppercase letters minus I and O.
const SERIAL_CODE_POINTS: &[u8] = b"0123456789ABCDEFGHJKLMNPQRSTUVWXYZ";
/// Length-code characters and the suffix length each encodes (1..=15).
const SERIAL_LENGTH_CODES: &[u8] = b"123456789ABCDEF";

/// EN4709-02 registration alphabet (base 36, lowercase).
const REGISTRATION_CODE_POINTS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const REGISTRATION_BASE_LEN: usize = 12;
const REGISTRATION_SECRET_LEN: usize = 3;

/// Flight-authorisation payload fields with the fixed fixture values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightAuthorisationData {
    pub uas_serial_number: String,
    pub operation_category: String,
    pub operation_mode: String,
    pub uas_class: String,
    pub identification_technologies: Vec<String>,
    pub connectivity_methods: Vec<String>,
    pub endurance_minutes: u32,
    pub emergency_procedure_url: String,
    pub operator_id: String,
    pub uas_id: String,
    pub uas_type_certificate: String,
}

impl FlightAuthorisationData {
    /// Assemble the fixture payload around generated identifiers.
    pub fn new(uas_serial_number: String, operator_id: String) -> Self {
        Self {
            uas_serial_number,
            operation_category: "Open".to_string(),
            operation_mode: "Vlos".to_string(),
            uas_class: "C0".to_string(),
            identification_technologies: vec!["ASTMNetRID".to_string()],
            connectivity_methods: vec!["cellular".to_string()],
            endurance_minutes: 30,
            emergency_procedure_url: "https://uav.com/emergency".to_string(),
            operator_id,
            uas_id: String::new(),
            uas_type_certificate: String::new(),
        }
    }
}

fn pick(rng: &mut impl Rng, alphabet: &[u8]) -> char {
    alphabet[rng.random_range(0..alphabet.len())] as char
}

fn serial_suffix_len(length_code: char) -> Option<usize> {
    SERIAL_LENGTH_CODES
        .iter()
        .position(|c| *c as char == length_code)
        .map(|i| i + 1)
}

/// Generate a valid CTA-2063-A physical serial number: 4-character
/// manufacturer code, a length code, and a random suffix of the coded
/// length.
pub fn generate_serial_number(rng: &mut impl Rng) -> String {
    let mut serial = String::new();
    for _ in 0..4 {
        serial.push(pick(rng, SERIAL_CODE_POINTS));
    }
    let length_code = pick(rng, SERIAL_LENGTH_CODES);
    serial.push(length_code);
    let suffix_len = serial_suffix_len(length_code).unwrap_or(1);
    for _ in 0..suffix_len {
        serial.push(pick(rng, SERIAL_CODE_POINTS));
    }
    serial
}

/// Corrupt a valid serial number: keep the manufacturer code and length
/// code, but regenerate the suffix with a different length so the declared
/// and actual lengths disagree.
pub fn corrupt_serial_number(rng: &mut impl Rng, valid: &str) -> String {
    let manufacturer = &valid[0..4];
    let length_code = valid[4..5].chars().next().unwrap_or('1');

    let other_codes: Vec<u8> = SERIAL_LENGTH_CODES
        .iter()
        .copied()
        .filter(|c| *c as char != length_code)
        .collect();
    let new_code = other_codes[rng.random_range(0..other_codes.len())] as char;
    let new_len = serial_suffix_len(new_code).unwrap_or(1);

    let mut serial = format!("{manufacturer}{length_code}");
    for _ in 0..new_len {
        serial.push(pick(rng, SERIAL_CODE_POINTS));
    }
    serial
}

/// Whether a serial number's suffix length matches its length code.
pub fn serial_number_is_valid(serial: &str) -> bool {
    if serial.len() < 6 || !serial.is_ascii() {
        return false;
    }
    let Some(length_code) = serial[4..5].chars().next() else {
        return false;
    };
    match serial_suffix_len(length_code) {
        Some(len) => serial.len() == 5 + len,
        None => false,
    }
}

/// Operation descriptions drawn for operator flight details.
const OPERATION_DESCRIPTIONS: &[&str] = &[
    "Electricity Grid Inspection",
    "Wind farm survey",
    "Solar Panel Inspection",
    "Traffic Monitoring",
    "Emergency services / rescue",
    "Delivery operation, see more details at https://deliveryops.com/operation",
    "News recording, live event",
    "Crop spraying / Agricultural Inspection",
];

/// Word lists for synthetic operator company names.
const COMPANY_STEMS: &[&str] = &[
    "Aero", "Alpine", "Helvetia", "Skyline", "Meridian", "Cumulus", "Vertex", "Nimbus",
];
const COMPANY_TRADES: &[&str] = &[
    "Drone Services", "Aviation", "Robotics", "Survey", "Logistics", "Airworks",
];
const COMPANY_FORMS: &[&str] = &["AG", "GmbH", "SA", "Ltd"];

/// Ground position of the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Operator details submitted alongside a flight's RID telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorFlightDetails {
    pub operator_id: String,
    pub operator_name: String,
    pub operator_location: OperatorLocation,
    pub operation_description: String,
    pub serial_number: String,
    pub registration_number: String,
}

/// Pick one of the fixed operation descriptions.
pub fn generate_operation_description(rng: &mut impl Rng) -> &'static str {
    OPERATION_DESCRIPTIONS[rng.random_range(0..OPERATION_DESCRIPTIONS.len())]
}

/// Synthetic operator company name from fixed word lists.
pub fn generate_company_name(rng: &mut impl Rng) -> String {
    format!(
        "{} {} {}",
        COMPANY_STEMS[rng.random_range(0..COMPANY_STEMS.len())],
        COMPANY_TRADES[rng.random_range(0..COMPANY_TRADES.len())],
        COMPANY_FORMS[rng.random_range(0..COMPANY_FORMS.len())],
    )
}

/// The operator stands at the study-area centroid (x = lng, y = lat).
pub fn operator_location_at(centroid: Coord<f64>) -> OperatorLocation {
    OperatorLocation {
        lat: centroid.y,
        lng: centroid.x,
    }
}

/// Assemble operator details for one flight: generated identifiers, a random
/// company name and operation description, and the centroid as the operator
/// position.
pub fn generate_operator_flight_details(
    rng: &mut impl Rng,
    registration_prefix: &str,
    centroid: Coord<f64>,
) -> OperatorFlightDetails {
    let registration_number = generate_operator_registration_number(rng, registration_prefix);
    OperatorFlightDetails {
        operator_id: registration_number.clone(),
        operator_name: generate_company_name(rng),
        operator_location: operator_location_at(centroid),
        operation_description: generate_operation_description(rng).to_string(),
        serial_number: generate_serial_number(rng),
        registration_number,
    }
}

fn registration_value(c: char) -> Option<usize> {
    REGISTRATION_CODE_POINTS.iter().position(|p| *p as char == c)
}

/// EN4709-02 mod-36 checksum over a 15-character base-36 id with alternating
/// weights 2 and 1; each weighted value contributes quotient + remainder of
/// its division by 36.
fn registration_checksum(raw_id: &str) -> Option<char> {
    if raw_id.len() != REGISTRATION_BASE_LEN + REGISTRATION_SECRET_LEN {
        return None;
    }
    let mut sum = 0usize;
    let mut factor = 2usize;
    for c in raw_id.chars() {
        let value = registration_value(c)? * factor;
        sum += value / 36 + value % 36;
        factor = if factor == 2 { 1 } else { 2 };
    }
    let control = (36 - sum % 36) % 36;
    Some(REGISTRATION_CODE_POINTS[control] as char)
}

/// Generate a valid operator registration number:
/// `<prefix><base12><checksum>-<secret3>`, checksum over base + secret.
pub fn generate_operator_registration_number(rng: &mut impl Rng, prefix: &str) -> String {
    let base_id: String = (0..REGISTRATION_BASE_LEN)
        .map(|_| pick(rng, REGISTRATION_CODE_POINTS))
        .collect();
    let secret: String = (0..REGISTRATION_SECRET_LEN)
        .map(|_| pick(rng, &REGISTRATION_CODE_POINTS[10..]))
        .collect();
    let checksum = registration_checksum(&format!("{base_id}{secret}"))
        .unwrap_or('0');
    format!("{prefix}{base_id}{checksum}-{secret}")
}

/// Corrupt a valid registration number by replacing the secret suffix,
/// which invalidates the recorded checksum with overwhelming probability.
pub fn corrupt_operator_registration_number(rng: &mut impl Rng, valid: &str) -> String {
    let visible = valid.split('-').next().unwrap_or(valid);
    let secret: String = (0..REGISTRATION_SECRET_LEN)
        .map(|_| pick(rng, &REGISTRATION_CODE_POINTS[10..]))
        .collect();
    format!("{visible}-{secret}")
}

/// Validate a registration number against its embedded checksum.
pub fn operator_registration_number_is_valid(registration: &str, prefix: &str) -> bool {
    let Some((visible, secret)) = registration.split_once('-') else {
        return false;
    };
    if !visible.starts_with(prefix) || secret.len() != REGISTRATION_SECRET_LEN {
        return false;
    }
    let tail = &visible[prefix.len()..];
    if tail.len() != REGISTRATION_BASE_LEN + 1 {
        return false;
    }
    let base_id = &tail[..REGISTRATION_BASE_LEN];
    let recorded = tail.chars().last();
    registration_checksum(&format!("{base_id}{secret}")) == recorded
}
