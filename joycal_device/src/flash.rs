use crate::{
    session::{short_read, ReplyMatch, RetryPolicy, Session, SessionError},
    transport::HidTransport,
};
use bytes::{Bytes, BytesMut};
use joycal_core::controller::{
    calibration::{StickCalibration, StickParams, STICK_CALIBRATION_LEN, STICK_PARAMS_LEN},
    flash::{FlashBlock, SERIAL_NUMBER_ADDR, SERIAL_NUMBER_LEN},
    report::{
        output::{OutputReport, SPI_TRANSFER_MAX_LEN},
        subcommand::Subcommand,
    },
    StickSide,
};
use tokio::time;

impl<T> Session<T>
where
    T: HidTransport,
{
    /// Reads `len` bytes of SPI flash starting at `offset`.
    ///
    /// Transfers larger than one frame are split. Gives up with
    /// [`SessionError::Timeout`] once the configured read limit is spent.
    #[tracing::instrument(target = "session", skip(self))]
    pub async fn read_spi(&mut self, offset: u32, len: usize) -> Result<Bytes, SessionError> {
        let policy = RetryPolicy::spi_read(self.spi_read_limit());
        self.read_spi_with(offset, len, policy)
            .await
            .map_err(|err| match err {
                SessionError::RetryBudgetExhausted { attempts } => {
                    SessionError::Timeout { attempts }
                }
                err => err,
            })
    }

    async fn read_spi_with(
        &mut self,
        offset: u32,
        len: usize,
        policy: RetryPolicy,
    ) -> Result<Bytes, SessionError> {
        let mut data = BytesMut::with_capacity(len);
        while data.len() < len {
            let size = (len - data.len()).min(SPI_TRANSFER_MAX_LEN);
            let chunk_offset = offset.saturating_add(data.len() as u32);
            let mut report = OutputReport::new();
            report.sub_0x10_spi_flash_read(chunk_offset, size)?;
            let reply = self
                .send_and_wait(
                    &mut report,
                    policy,
                    ReplyMatch::SpiRead {
                        offset: chunk_offset,
                        size: size as u8,
                    },
                )
                .await?;
            data.extend_from_slice(&reply.spi_read_payload(size).map_err(short_read)?);
        }
        Ok(data.freeze())
    }

    /// Writes `data` to SPI flash starting at `offset`.
    ///
    /// Every frame is followed by the settle delay, whether or not the
    /// controller acknowledged it.
    #[tracing::instrument(target = "session", skip(self, data))]
    pub async fn write_spi(&mut self, offset: u32, data: &[u8]) -> Result<(), SessionError> {
        for (index, chunk) in data.chunks(SPI_TRANSFER_MAX_LEN).enumerate() {
            let chunk_offset = offset.saturating_add((index * SPI_TRANSFER_MAX_LEN) as u32);
            let mut report = OutputReport::new();
            report.sub_0x11_spi_flash_write(chunk_offset, chunk)?;
            tracing::info!(
                "writing {} bytes to flash at {:#06x}.",
                chunk.len(),
                chunk_offset
            );
            let result = self
                .send_and_wait(
                    &mut report,
                    RetryPolicy::spi_write(),
                    ReplyMatch::Ack(Subcommand::SpiFlashWrite.reply_ack()),
                )
                .await;
            time::sleep(self.write_settle_delay()).await;
            if let Err(err) = result {
                tracing::warn!("flash write at {:#06x} failed: {}", chunk_offset, err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Reads the controller's serial number, skipping zero padding.
    #[tracing::instrument(target = "session", skip(self))]
    pub async fn serial_number(&mut self) -> Result<String, SessionError> {
        let data = self
            .read_spi_with(
                SERIAL_NUMBER_ADDR,
                SERIAL_NUMBER_LEN,
                RetryPolicy::bounded_query(),
            )
            .await?;
        Ok(data
            .iter()
            .filter(|&&byte| byte != 0x00)
            .map(|&byte| byte as char)
            .collect())
    }

    // Address of `block` on this session's controller. Blocks a controller
    // does not write fall back to the two-stick layout.
    fn block_address(&self, block: FlashBlock) -> u32 {
        self.kind()
            .flash_address(block)
            .unwrap_or_else(|| block.default_address())
    }

    #[tracing::instrument(target = "session", skip(self))]
    pub async fn read_stick_calibration(
        &mut self,
        side: StickSide,
    ) -> Result<StickCalibration, SessionError> {
        let address = self.block_address(FlashBlock::calibration(side));
        let block = self.read_spi(address, STICK_CALIBRATION_LEN).await?;
        Ok(StickCalibration::with_block(side, &block)?)
    }

    #[tracing::instrument(target = "session", skip(self))]
    pub async fn read_stick_params(&mut self, side: StickSide) -> Result<StickParams, SessionError> {
        let address = self.block_address(FlashBlock::params(side));
        let block = self.read_spi(address, STICK_PARAMS_LEN).await?;
        Ok(StickParams::with_block(&block)?)
    }
}
