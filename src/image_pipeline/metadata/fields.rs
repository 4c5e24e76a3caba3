use std::collections::BTreeMap;

/// `xmp` namespace
pub const XMP_NAMESPACE: &[u8] = b"http://ns.adobe.com/xap/1.0/";
/// `crs` (camera raw settings) namespace
pub const CRS_NAMESPACE: &[u8] = b"http://ns.adobe.com/camera-raw-settings/1.0/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtractedField {
    CreateDate,
    ModifyDate,
    RawFileName,
    CameraProfileName,
}

impl ExtractedField {
    pub const ALL: [ExtractedField; 4] = [
        ExtractedField::CreateDate,
        ExtractedField::ModifyDate,
        ExtractedField::RawFileName,
        ExtractedField::CameraProfileName,
    ];

    pub fn namespace(self) -> &'static [u8] {
        match self {
            ExtractedField::CreateDate | ExtractedField::ModifyDate => XMP_NAMESPACE,
            ExtractedField::RawFileName | ExtractedField::CameraProfileName => CRS_NAMESPACE,
        }
    }

    /// Property names accepted for the field. Camera Raw writes the profile
    /// as `crs:CameraProfile`; the longer spelling is accepted as well.
    pub fn local_names(self) -> &'static [&'static str] {
        match self {
            ExtractedField::CreateDate => &["CreateDate"],
            ExtractedField::ModifyDate => &["ModifyDate"],
            ExtractedField::RawFileName => &["RawFileName"],
            ExtractedField::CameraProfileName => &["CameraProfile", "CameraProfileName"],
        }
    }

    pub fn lookup(namespace: &[u8], local_name: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|f| {
            f.namespace() == namespace
                && f.local_names().iter().any(|n| n.as_bytes() == local_name)
        })
    }
}

/// Fields pulled out of an XMP packet. Missing fields are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmpFields {
    values: BTreeMap<ExtractedField, String>,
}

impl XmpFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: ExtractedField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExtractedField, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Records `raw` for `field` unless the field is already set or the
    /// value is blank. Returns whether the value was kept.
    pub fn insert_first(&mut self, field: ExtractedField, raw: &str) -> bool {
        if self.values.contains_key(&field) {
            return false;
        }

        let trimmed = raw.trim();
        let value = match field {
            ExtractedField::RawFileName => file_name_component(trimmed),
            _ => trimmed,
        };
        if value.is_empty() {
            return false;
        }

        self.values.insert(field, value.to_string());
        true
    }
}

/// Last path component, accepting both `/` and `\` separators.
pub fn file_name_component(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
