//! File transfer packets, used to push firmware and configuration files to a device.
//!
//! A transfer starts with a [FileTransferRequest] carrying the first block of data,
//! continues with [FileTransfer] packets, and each is answered by a
//! [FileTransferAcknowledge] from the device.
use super::{fixed, records, Decode, DecodeError, Encode, PacketId, PacketKind};
use crate::bytes::Writer;
use crate::framing::{Frame, MAX_PAYLOAD_LEN};
use crate::Result;

value_enum! {
    #[derive(Default)]
    pub enum DataEncoding: u8 {
        #[default]
        Binary = 0,
        Aes256 = 1,
    }
}

value_enum! {
    #[derive(Default)]
    pub enum MetadataType: u8 {
        #[default]
        None = 0,
        ExtendedAnpp = 1,
        Utf8Filename = 2,
        AnFirmware = 3,
    }
}

/// First packet of a transfer.
///
/// Only encoded: the metadata length is implied by its type, so a received request
/// cannot be split into metadata and data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileTransferRequest {
    pub unique_id: u32,
    pub data_index: u32,
    pub total_size: u32,
    pub data_encoding: DataEncoding,
    pub metadata_type: MetadataType,
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub metadata: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub data: Vec<u8>,
}

impl FileTransferRequest {
    pub const HEAD_LEN: usize = 14;

    /// Bytes of data that fit in one request alongside `metadata_len` bytes of metadata.
    #[must_use]
    pub fn data_capacity(metadata_len: usize) -> usize {
        MAX_PAYLOAD_LEN.saturating_sub(Self::HEAD_LEN + metadata_len)
    }
}

impl PacketKind for FileTransferRequest {
    const ID: PacketId = PacketId::FileTransferRequest;
}

impl Encode for FileTransferRequest {
    fn encode(&self) -> Result<Frame> {
        let mut w =
            Writer::with_capacity(Self::HEAD_LEN + self.metadata.len() + self.data.len());
        w.u32(self.unique_id)
            .u32(self.data_index)
            .u32(self.total_size)
            .u8(self.data_encoding.into())
            .u8(self.metadata_type.into())
            .bytes(&self.metadata)
            .bytes(&self.data);
        w.into_frame(Self::ID.into())
    }
}

value_enum! {
    pub enum FileTransferResponse: u8 {
        CompletedSuccessfully = 0,
        Ready = 1,
        IndexMismatch = 2,
        Refused = 64,
        BadMetadata = 65,
        Timeout = 66,
        RetryError = 67,
        StorageError = 68,
        DataInvalid = 69,
        PacketLengthInvalid = 70,
        TotalSizeInvalid = 71,
        OverflowError = 72,
        Busy = 73,
        Cancelled = 74,
        FileNotFound = 128,
        AccessDenied = 129,
    }
}

impl FileTransferResponse {
    /// Whether the transfer can continue after this response.
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(
            self,
            FileTransferResponse::CompletedSuccessfully | FileTransferResponse::Ready
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileTransferAcknowledge {
    pub unique_id: u32,
    /// Index of the next byte the device expects.
    pub data_index: u32,
    pub response: FileTransferResponse,
}

impl FileTransferAcknowledge {
    pub const LEN: usize = 9;
}

impl PacketKind for FileTransferAcknowledge {
    const ID: PacketId = PacketId::FileTransferAcknowledge;
}

impl Decode for FileTransferAcknowledge {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(FileTransferAcknowledge {
            unique_id: r.u32()?,
            data_index: r.u32()?,
            response: r.u8()?.try_into()?,
        })
    }
}

/// A block of file data following the initial request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileTransfer {
    pub unique_id: u32,
    pub data_index: u32,
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub data: Vec<u8>,
}

impl FileTransfer {
    pub const HEAD_LEN: usize = 8;
    /// Most data a single packet can carry.
    pub const DATA_CAPACITY: usize = MAX_PAYLOAD_LEN - Self::HEAD_LEN;
}

impl PacketKind for FileTransfer {
    const ID: PacketId = PacketId::FileTransfer;
}

impl Decode for FileTransfer {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let (mut r, _) = records::<Self>(frame, Self::HEAD_LEN, 1)?;
        Ok(FileTransfer {
            unique_id: r.u32()?,
            data_index: r.u32()?,
            data: r.rest().to_vec(),
        })
    }
}

impl Encode for FileTransfer {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::HEAD_LEN + self.data.len());
        w.u32(self.unique_id)
            .u32(self.data_index)
            .bytes(&self.data);
        w.into_frame(Self::ID.into())
    }
}
