use std::io::Write;
use std::path::Path;

use nom::bytes::complete::{tag, take_until};
use nom::number::complete::{le_f32, le_i32};
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::message::{Message, MessageKind, parse_messages};
use crate::IResult;

/// One recorded server frame: the client's view angles at the time it was
/// received and every message in the packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub view_angles: [f32; 3],
    pub messages: Vec<Message>,
}

impl Block {
    /// Blocks that consist of a single `svc_nop`, as written while the client
    /// is still connecting.
    pub fn is_nop(&self) -> bool {
        matches!(self.messages.as_slice(), [m] if m.kind() == MessageKind::Nop)
    }

    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for message in &self.messages {
            message.write_to(&mut out);
        }
        out
    }

    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        let payload = self.payload();
        let length = i32::try_from(payload.len()).map_err(|_| Error::BlockTooLarge {
            length: payload.len(),
        })?;
        out.extend_from_slice(&length.to_le_bytes());
        for angle in self.view_angles {
            out.extend_from_slice(&angle.to_le_bytes());
        }
        out.extend_from_slice(&payload);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoFile {
    /// The cd track line at the start of the file, including its newline.
    pub cd_track: Vec<u8>,
    pub blocks: Vec<Block>,
}

fn parse_header(i: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let (rest, track) = take_until(&b"\n"[..])(i)?;
    let (rest, newline) = tag(&b"\n"[..])(rest)?;
    let mut header = track.to_vec();
    header.extend_from_slice(newline);
    Ok((rest, header))
}

fn parse_block_header(i: &[u8]) -> IResult<&[u8], (i32, [f32; 3])> {
    let (i, length) = le_i32(i)?;
    let (i, pitch) = le_f32(i)?;
    let (i, yaw) = le_f32(i)?;
    let (i, roll) = le_f32(i)?;
    Ok((i, (length, [pitch, yaw, roll])))
}

impl DemoFile {
    pub fn from_file(path: &Path) -> Result<DemoFile, Error> {
        let data = std::fs::read(path)?;
        DemoFile::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<DemoFile, Error> {
        let (mut i, cd_track) = parse_header(data).map_err(|_| Error::UnterminatedHeader)?;

        let mut blocks = Vec::new();
        while !i.is_empty() {
            let index = blocks.len();
            let (rest, (length, view_angles)) = parse_block_header(i)?;
            let length = usize::try_from(length)
                .map_err(|_| Error::NegativeBlockLength { index, length })?;
            if rest.len() < length {
                return Err(Error::TruncatedBlock {
                    index,
                    expected: length,
                    found: rest.len(),
                });
            }

            let (payload, rest) = rest.split_at(length);
            let (_, messages) = parse_messages(payload).map_err(|e| Error::Block {
                index,
                source: Box::new(e.into()),
            })?;

            blocks.push(Block {
                view_angles,
                messages,
            });
            i = rest;
        }

        debug!("parsed demo with {} blocks", blocks.len());

        Ok(DemoFile { cd_track, blocks })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), Error> {
        let mut file = std::fs::File::create(path)?;
        self.write(&mut file)?;
        file.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = self.cd_track.clone();
        for block in &self.blocks {
            block.write_to(&mut out)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ServerCommand;

    fn block_bytes(angles: [f32; 3], payload: &[u8]) -> Vec<u8> {
        let mut out = (payload.len() as i32).to_le_bytes().to_vec();
        for a in angles {
            out.extend_from_slice(&a.to_le_bytes());
        }
        out.extend_from_slice(payload);
        out
    }

    fn sample_demo() -> Vec<u8> {
        let mut data = b"-1\n".to_vec();
        data.extend(block_bytes([0.0; 3], &[ServerCommand::Nop as u8]));

        let mut payload = vec![ServerCommand::Time as u8];
        payload.extend_from_slice(&1.25f32.to_le_bytes());
        payload.extend_from_slice(&[ServerCommand::SetView as u8, 0x01, 0x00]);
        payload.push(ServerCommand::KilledMonster as u8);
        data.extend(block_bytes([10.5, -90.0, f32::from_bits(0x7fc0_0001)], &payload));
        data
    }

    #[test]
    fn parses_blocks_and_header() {
        let demo = DemoFile::parse(&sample_demo()).unwrap();
        assert_eq!(demo.cd_track, b"-1\n");
        assert_eq!(demo.blocks.len(), 2);
        assert!(demo.blocks[0].is_nop());
        assert!(!demo.blocks[1].is_nop());
        assert_eq!(demo.blocks[1].messages.len(), 3);
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let data = sample_demo();
        let demo = DemoFile::parse(&data).unwrap();
        assert_eq!(demo.to_bytes().unwrap(), data);

        let mut written = Vec::new();
        demo.write(&mut written).unwrap();
        assert_eq!(written, data);
    }

    #[test]
    fn truncated_block_is_rejected() {
        let mut data = sample_demo();
        data.pop();
        assert!(matches!(
            DemoFile::parse(&data),
            Err(Error::TruncatedBlock { index: 1, .. })
        ));
    }

    #[test]
    fn bad_message_reports_block_index() {
        let mut data = b"0\n".to_vec();
        data.extend(block_bytes([0.0; 3], &[ServerCommand::Bad as u8]));
        assert!(matches!(
            DemoFile::parse(&data),
            Err(Error::Block { index: 0, .. })
        ));
    }

    #[test]
    fn missing_header_newline() {
        assert!(matches!(
            DemoFile::parse(b"-1"),
            Err(Error::UnterminatedHeader)
        ));
    }
}
