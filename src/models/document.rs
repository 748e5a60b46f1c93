// src/models/document.rs

use serde::Serialize;

use crate::common::error::FieldErrors;

/// Limite de tamanho de um documento enviado (2 MiB).
pub const MAX_DOCUMENT_BYTES: u64 = 2 * 1024 * 1024;

/// Tipos aceitos e a extensão com que cada um é gravado.
pub const ALLOWED_MIME_TYPES: &[(&str, &str)] = &[("application/pdf", "pdf"), ("image/jpeg", "jpg")];

/// Um arquivo enviado junto com o cadastro. A camada HTTP entrega os bytes
/// já lidos, o tipo declarado e o tamanho declarado.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub size: u64,
}

impl Upload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        let size = bytes.len() as u64;
        Self {
            bytes,
            mime_type: mime_type.into(),
            size,
        }
    }

    pub fn extension(&self) -> Option<&'static str> {
        let mime = self.mime_type.trim().to_ascii_lowercase();
        ALLOWED_MIME_TYPES
            .iter()
            .find(|(allowed, _)| *allowed == mime)
            .map(|(_, ext)| *ext)
    }

    /// Verifica tipo e tamanho. O tamanho efetivo é o maior entre o declarado e o real.
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.extension().is_none() {
            errors.add("document", "O documento deve ser PDF ou JPEG.");
        }
        let effective = self.size.max(self.bytes.len() as u64);
        if effective > MAX_DOCUMENT_BYTES {
            errors.add("document", "O documento deve ter no máximo 2MB.");
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Referência devolvida pelo DocumentStore depois de gravar um arquivo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredDocument {
    pub reference: String,
    pub url: String,
}
