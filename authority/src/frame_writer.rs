use synchrony_shared::{
    write_count, BitWriter, FrameHeader, ReferenceId, Serde, TypeCode, TypeEncoder,
    UnsignedVariableInteger,
};

use crate::{error::SourceError, synchronizer::Payload};

/// A tracked reference to be written into a frame
pub(crate) struct OutgoingEntry {
    pub id: ReferenceId,
    /// Present when the replica has not seen the reference yet
    pub type_code: Option<TypeCode>,
    pub payload: Payload,
}

pub(crate) struct FrameWriter;

impl FrameWriter {
    pub fn write(
        header: FrameHeader,
        encoder: &mut TypeEncoder,
        removed: &[ReferenceId],
        entries: &[OutgoingEntry],
    ) -> Result<Vec<u8>, SourceError> {
        let mut writer = BitWriter::new();

        header.ser(&mut writer);
        encoder.write_announcements(&mut writer, header.full);

        // a full frame implies removal of everything it does not carry
        if !header.full {
            write_count(removed.len(), &mut writer);
            for id in removed {
                id.ser(&mut writer);
            }
        }

        write_count(entries.len(), &mut writer);
        for entry in entries {
            Self::write_entry(&mut writer, entry)?;
        }

        Ok(writer.to_bytes())
    }

    fn write_entry(writer: &mut BitWriter, entry: &OutgoingEntry) -> Result<(), SourceError> {
        entry.id.ser(writer);
        entry.type_code.is_some().ser(writer);
        if let Some(code) = entry.type_code {
            UnsignedVariableInteger::<7>::new(code).ser(writer);
        }
        entry.payload.write(writer)
    }
}
