//! Strict positional decoding at the ledger boundary.
//!
//! The ledger answers with tuple-indexed values. Every response is checked
//! here for arity and per-field type exactly once and turned into a typed
//! value. Canonical encodings used when building requests or fixtures:
//!
//! - addresses and 32-byte hashes: `0x`-prefixed lowercase hex strings
//! - unsigned integers: JSON numbers (decimal or `0x` hex strings are also
//!   accepted on decode)
//! - booleans and strings: JSON booleans and strings

use alloy_primitives::{Address, B256};
use provenance_types::{
    ClaimId, ClaimProcessed, ClaimSubmitted, ProductDetails, ProductId, RawEventRecord,
    RecordKind, RecordPayload, Registered, ServiceRecorded, Transferred, WarrantyActivated,
    WarrantyClaim,
};
use serde_json::Value;

use crate::call::RawLog;
use crate::error::{DecodeError, GatewayError, GatewayResult};

const PRODUCT_DETAILS_ARITY: usize = 9;
const WARRANTY_CLAIM_ARITY: usize = 8;

pub fn encode_address(address: &Address) -> Value {
    Value::String(alloy_primitives::hex::encode_prefixed(address.as_slice()))
}

pub fn encode_b256(hash: &B256) -> Value {
    Value::String(alloy_primitives::hex::encode_prefixed(hash.as_slice()))
}

pub fn encode_uint(value: u64) -> Value {
    Value::from(value)
}

/// Compare two wire values the way an indexed-topic match would.
pub fn values_equivalent(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => {
            a.eq_ignore_ascii_case(b) || matches!((parse_uint(left), parse_uint(right)), (Some(x), Some(y)) if x == y)
        }
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            matches!((parse_uint(left), parse_uint(right)), (Some(x), Some(y)) if x == y)
        }
        _ => left == right,
    }
}

/// Encode a record payload into its event name and positional arguments.
pub fn encode_payload(payload: &RecordPayload) -> (&'static str, Vec<Value>) {
    let args = match payload {
        RecordPayload::Registered(r) => vec![
            encode_uint(r.product_id.0),
            Value::from(r.serial_number.clone()),
            Value::from(r.model.clone()),
            encode_address(&r.manufacturer),
            encode_address(&r.initial_owner),
            encode_uint(r.registered_at),
            encode_uint(r.warranty_duration),
            encode_uint(u64::from(r.claim_limit)),
        ],
        RecordPayload::WarrantyActivated(r) => vec![
            encode_uint(r.product_id.0),
            encode_address(&r.customer),
            encode_uint(r.starts_at),
            encode_uint(r.expires_at),
        ],
        RecordPayload::Transferred(r) => vec![
            encode_address(&r.from),
            encode_address(&r.to),
            encode_uint(r.product_id.0),
        ],
        RecordPayload::ClaimSubmitted(r) => vec![
            encode_uint(r.claim_id.0),
            encode_uint(r.product_id.0),
            encode_address(&r.customer),
            Value::from(r.issue.clone()),
            encode_uint(r.submitted_at),
        ],
        RecordPayload::ClaimProcessed(r) => vec![
            encode_uint(r.claim_id.0),
            encode_uint(r.product_id.0),
            encode_address(&r.service_center),
            Value::Bool(r.approved),
            encode_uint(r.processed_at),
        ],
        RecordPayload::ServiceRecorded(r) => vec![
            encode_uint(r.product_id.0),
            encode_uint(r.claim_id.0),
            encode_address(&r.service_center),
            Value::from(r.notes.clone()),
            encode_uint(r.serviced_at),
        ],
    };
    (payload.kind().event_name(), args)
}

pub fn encode_product_details(details: &ProductDetails) -> Vec<Value> {
    vec![
        Value::from(details.serial_number.clone()),
        Value::from(details.model.clone()),
        encode_address(&details.manufacturer),
        encode_uint(details.manufactured_at),
        encode_uint(details.warranty_duration),
        encode_uint(details.warranty_start),
        encode_uint(details.warranty_expiration),
        encode_uint(u64::from(details.claim_limit)),
        encode_uint(u64::from(details.claim_count)),
    ]
}

pub fn encode_warranty_claim(claim: &WarrantyClaim) -> Vec<Value> {
    vec![
        encode_uint(claim.product_id.0),
        encode_address(&claim.customer),
        Value::from(claim.issue.clone()),
        encode_uint(claim.submitted_at),
        Value::Bool(claim.processed),
        Value::Bool(claim.approved),
        Value::from(claim.service_notes.clone()),
        encode_uint(claim.processed_at),
    ]
}

/// Decode one emitted record.
pub fn decode_record(log: &RawLog) -> GatewayResult<RawEventRecord> {
    let kind = RecordKind::from_event_name(&log.event)
        .ok_or_else(|| GatewayError::UnknownEvent(log.event.clone()))?;
    let fields = Fields::new(kind.event_name(), &log.args, kind.arity())?;

    let payload = match kind {
        RecordKind::Registered => RecordPayload::Registered(Registered {
            product_id: ProductId(fields.uint(0)?),
            serial_number: fields.string(1)?,
            model: fields.string(2)?,
            manufacturer: fields.address(3)?,
            initial_owner: fields.address(4)?,
            registered_at: fields.uint(5)?,
            warranty_duration: fields.uint(6)?,
            claim_limit: fields.uint32(7)?,
        }),
        RecordKind::WarrantyActivated => RecordPayload::WarrantyActivated(WarrantyActivated {
            product_id: ProductId(fields.uint(0)?),
            customer: fields.address(1)?,
            starts_at: fields.uint(2)?,
            expires_at: fields.uint(3)?,
        }),
        RecordKind::Transferred => RecordPayload::Transferred(Transferred {
            from: fields.address(0)?,
            to: fields.address(1)?,
            product_id: ProductId(fields.uint(2)?),
        }),
        RecordKind::ClaimSubmitted => RecordPayload::ClaimSubmitted(ClaimSubmitted {
            claim_id: ClaimId(fields.uint(0)?),
            product_id: ProductId(fields.uint(1)?),
            customer: fields.address(2)?,
            issue: fields.string(3)?,
            submitted_at: fields.uint(4)?,
        }),
        RecordKind::ClaimProcessed => RecordPayload::ClaimProcessed(ClaimProcessed {
            claim_id: ClaimId(fields.uint(0)?),
            product_id: ProductId(fields.uint(1)?),
            service_center: fields.address(2)?,
            approved: fields.boolean(3)?,
            processed_at: fields.uint(4)?,
        }),
        RecordKind::ServiceRecorded => RecordPayload::ServiceRecorded(ServiceRecorded {
            product_id: ProductId(fields.uint(0)?),
            claim_id: ClaimId(fields.uint(1)?),
            service_center: fields.address(2)?,
            notes: fields.string(3)?,
            serviced_at: fields.uint(4)?,
        }),
    };

    Ok(RawEventRecord {
        block_number: log.block_number,
        log_index: log.log_index,
        transaction: log.transaction,
        block_timestamp: None,
        payload,
    })
}

/// Decode `getProductDetails`. The all-zero tuple is the absent sentinel.
pub fn decode_product_details(values: &[Value]) -> Result<Option<ProductDetails>, DecodeError> {
    let fields = Fields::new("getProductDetails", unwrap_struct(values), PRODUCT_DETAILS_ARITY)?;
    let details = ProductDetails {
        serial_number: fields.string(0)?,
        model: fields.string(1)?,
        manufacturer: fields.address(2)?,
        manufactured_at: fields.uint(3)?,
        warranty_duration: fields.uint(4)?,
        warranty_start: fields.uint(5)?,
        warranty_expiration: fields.uint(6)?,
        claim_limit: fields.uint32(7)?,
        claim_count: fields.uint32(8)?,
    };
    let absent = details.manufactured_at == 0 && details.manufacturer == Address::ZERO;
    Ok((!absent).then_some(details))
}

/// Decode `getWarrantyClaim`. A zero product id marks an absent claim.
pub fn decode_warranty_claim(values: &[Value]) -> Result<Option<WarrantyClaim>, DecodeError> {
    let fields = Fields::new("getWarrantyClaim", unwrap_struct(values), WARRANTY_CLAIM_ARITY)?;
    let claim = WarrantyClaim {
        product_id: ProductId(fields.uint(0)?),
        customer: fields.address(1)?,
        issue: fields.string(2)?,
        submitted_at: fields.uint(3)?,
        processed: fields.boolean(4)?,
        approved: fields.boolean(5)?,
        service_notes: fields.string(6)?,
        processed_at: fields.uint(7)?,
    };
    Ok((!claim.product_id.is_sentinel()).then_some(claim))
}

pub fn decode_single_address(selector: &str, values: &[Value]) -> Result<Address, DecodeError> {
    Fields::new(selector, values, 1)?.address(0)
}

pub fn decode_single_uint(selector: &str, values: &[Value]) -> Result<u64, DecodeError> {
    Fields::new(selector, values, 1)?.uint(0)
}

pub fn decode_single_bool(selector: &str, values: &[Value]) -> Result<bool, DecodeError> {
    Fields::new(selector, values, 1)?.boolean(0)
}

pub fn decode_single_b256(selector: &str, values: &[Value]) -> Result<B256, DecodeError> {
    Fields::new(selector, values, 1)?.b256(0)
}

/// Struct returns may arrive wrapped in a one-element outer tuple.
fn unwrap_struct(values: &[Value]) -> &[Value] {
    match values {
        [Value::Array(inner)] => inner.as_slice(),
        other => other,
    }
}

fn parse_uint(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
            Some(_) => None,
            None => text.parse::<u64>().ok(),
        },
        _ => None,
    }
}

/// Arity-checked view over one positional tuple.
struct Fields<'a> {
    context: &'a str,
    values: &'a [Value],
}

impl<'a> Fields<'a> {
    fn new(context: &'a str, values: &'a [Value], arity: usize) -> Result<Self, DecodeError> {
        if values.len() != arity {
            return Err(DecodeError::new(
                context,
                format!("expected {arity} fields, found {}", values.len()),
            ));
        }
        Ok(Self { context, values })
    }

    fn error(&self, index: usize, expected: &str) -> DecodeError {
        DecodeError::new(
            format!("{}[{index}]", self.context),
            format!("expected {expected}, found {}", self.values[index]),
        )
    }

    fn uint(&self, index: usize) -> Result<u64, DecodeError> {
        parse_uint(&self.values[index]).ok_or_else(|| self.error(index, "unsigned integer"))
    }

    fn uint32(&self, index: usize) -> Result<u32, DecodeError> {
        self.uint(index)?
            .try_into()
            .map_err(|_| self.error(index, "32-bit unsigned integer"))
    }

    fn boolean(&self, index: usize) -> Result<bool, DecodeError> {
        self.values[index]
            .as_bool()
            .ok_or_else(|| self.error(index, "boolean"))
    }

    fn string(&self, index: usize) -> Result<String, DecodeError> {
        self.values[index]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.error(index, "string"))
    }

    fn address(&self, index: usize) -> Result<Address, DecodeError> {
        self.values[index]
            .as_str()
            .and_then(|text| provenance_types::parse_address(text).ok())
            .ok_or_else(|| self.error(index, "address"))
    }

    fn b256(&self, index: usize) -> Result<B256, DecodeError> {
        self.values[index]
            .as_str()
            .filter(|text| text.len() == 66 && text.starts_with("0x"))
            .and_then(|text| text.parse::<B256>().ok())
            .ok_or_else(|| self.error(index, "32-byte hash"))
    }
}
