use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{AssetError, AssetResult};

/// Discriminator written by the seeding operation.
pub const DOC_TYPE: &str = "asset";

/// Field holding the key a record is stored under.
pub const ID_FIELD: &str = "ID";
pub const OWNER_FIELD: &str = "owner";

/// A decoded record: named fields mapped to JSON values. There is no fixed
/// schema; which fields are present depends on the operation that wrote it.
pub type AssetRecord = Map<String, Value>;

/// Descriptive record written by the seeding operation.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SeedAsset {
    #[serde(rename = "ID")]
    pub id: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub address: &'static str,
    pub email: &'static str,
    pub gender: &'static str,
    pub blood_group: &'static str,
    pub phone_number: &'static str,
    pub emergency_phone_number: &'static str,
    #[serde(rename = "docType", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<&'static str>
}

macro_rules! seed {
    ($id:literal, $first:literal, $last:literal, $address:literal, $email:literal,
     $gender:literal, $blood:literal, $phone:literal, $emergency:literal) => {
        SeedAsset {
            id: $id,
            first_name: $first,
            last_name: $last,
            address: $address,
            email: $email,
            gender: $gender,
            blood_group: $blood,
            phone_number: $phone,
            emergency_phone_number: $emergency,
            doc_type: None
        }
    };
}

pub const SEED_ASSETS: [SeedAsset; 10] = [
    seed!("1", "Car", "Gartsyde", "95626 American Ash Point", "cgartsyde0@scribd.com",
          "Genderqueer", "A+", "339-670-2138", "393-775-9395"),
    seed!("2", "Barrett", "Parkinson", "56140 Mayfield Place", "bparkinson1@wsj.com",
          "Male", "A+", "166-680-3331", "881-251-8670"),
    seed!("3", "Jeanna", "Van den Velden", "707 Jenifer Drive", "jvandenvelden2@biblegateway.com",
          "Bigender", "A+", "634-968-8846", "300-692-4657"),
    seed!("4", "Jabez", "Giron", "706 Roth Junction", "jgiron3@patch.com",
          "Genderqueer", "A+", "627-973-9495", "565-502-1174"),
    seed!("5", "Mycah", "MacAndrew", "86 Mosinee Crossing", "mmacandrew4@gov.uk",
          "Non-binary", "A+", "937-327-9051", "924-402-0542"),
    seed!("6", "Saunder", "Cranston", "250 Moose Court", "scranston5@goo.ne.jp",
          "Male", "A+", "254-219-9419", "502-925-9980"),
    seed!("7", "Mignonne", "Messom", "25440 Rigney Court", "mmessom6@qq.com",
          "Polygender", "A+", "414-796-5707", "593-170-2663"),
    seed!("8", "Wilow", "Culshaw", "27934 Grayhawk Drive", "wculshaw7@wufoo.com",
          "Bigender", "A+", "696-839-8069", "799-347-1967"),
    seed!("9", "Grete", "Broseke", "76498 Hallows Alley", "gbroseke8@tuttocitta.it",
          "Genderfluid", "A+", "426-263-5140", "124-533-6845"),
    seed!("10", "Amandi", "Stoppard", "27 Donald Crossing", "astoppard9@bandcamp.com",
          "Non-binary", "A+", "936-820-9485", "277-646-9288"),
];

impl SeedAsset {
    /// Copy of this record carrying the discriminator field.
    pub fn tagged(&self) -> SeedAsset {
        SeedAsset { doc_type: Some(DOC_TYPE), ..*self }
    }
}

/// Record written by an update. It replaces whatever was stored before.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppraisedAsset {
    #[serde(rename = "ID")]
    pub id: String,
    pub color: String,
    pub size: String,
    pub owner: String,
    #[serde(rename = "appraisedValue")]
    pub appraised_value: String
}

/// Result of decoding one stored value during enumeration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Decoded(Value),
    /// The stored bytes were not JSON and are reported as text.
    Raw(String)
}

/// One `{Key, Record}` item of an enumeration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssetEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: Record
}

/// Extracts the non-empty string `ID` of a JSON object payload.
pub fn extract_id(payload: &[u8]) -> AssetResult<String> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|err| AssetError::decode("asset payload", err))?;

    match value.get(ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(_) => Err(AssetError::malformed("asset payload", "ID must be a non-empty string")),
        None => Err(AssetError::malformed("asset payload", "missing ID field"))
    }
}

/// Decodes a stored value that must be a JSON object.
pub fn decode_record(id: &str, raw: &[u8]) -> AssetResult<AssetRecord> {
    serde_json::from_slice(raw)
        .map_err(|err| AssetError::decode(format!("asset {}", id), err))
}
