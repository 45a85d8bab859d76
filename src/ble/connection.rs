//! Connection manager - one phone at a time, bonded and encrypted.
//!
//! Loop: advertise → secure the link → read the clock → run the AMS
//! session until disconnect → advertise again.

use core::cell::{Cell, RefCell};

use ams2oled::ams::MediaStore;
use ams2oled::ui::ButtonEvent;
use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use heapless::Vec;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode};
use nrf_softdevice::raw;
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

use crate::ble::cts_client::{self, ClockSample};
use crate::ble::{advertiser, ams_gatt, BleEvent};
use crate::config;
use crate::config::{BUTTON_QUEUE_DEPTH, MAX_BONDS};
use crate::error::{BleError, Error};

/// Last clock reading, shared with the UI.
pub type ClockCell = Mutex<CriticalSectionRawMutex, Cell<Option<ClockSample>>>;

/// Shared resources the BLE task works on.
pub struct BleContext {
    pub store: &'static MediaStore<CriticalSectionRawMutex>,
    pub buttons: Receiver<'static, CriticalSectionRawMutex, ButtonEvent, BUTTON_QUEUE_DEPTH>,
    pub events: Sender<'static, CriticalSectionRawMutex, BleEvent, 8>,
    pub redraw: &'static Signal<CriticalSectionRawMutex, ()>,
    pub clock: &'static ClockCell,
}

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

/// RAM-only bond table. Bonds are lost on reset; the phone then pairs
/// again.
struct Bonder {
    peers: RefCell<Vec<PeerBond, MAX_BONDS>>,
}

impl Bonder {
    fn new() -> Self {
        Self {
            peers: RefCell::new(Vec::new()),
        }
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        let mut peers = self.peers.borrow_mut();
        if let Some(existing) = peers.iter_mut().find(|p| p.master_id == master_id) {
            existing.key = key;
            existing.peer_id = peer_id;
            return;
        }

        if peers.is_full() {
            peers.remove(0);
        }

        let _ = peers.push(PeerBond {
            master_id,
            key,
            peer_id,
        });
        info!("Bonded ({} peers stored)", peers.len());
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peers
            .borrow()
            .iter()
            .find_map(|p| (p.master_id == master_id).then_some(p.key))
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}

pub async fn ble_task(sd: &'static Softdevice, ctx: BleContext) -> ! {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    let bonder: &'static Bonder = BONDER.init(Bonder::new());

    loop {
        ctx.events.send(BleEvent::Advertising).await;

        match connect_and_run(sd, bonder, &ctx).await {
            Ok(()) => {
                ctx.events.send(BleEvent::Disconnected).await;
            }
            Err(e) => {
                warn!("Session failed: {}", e);
                ctx.events.send(BleEvent::Error(e.tag())).await;
                Timer::after(Duration::from_millis(config::RECONNECT_BACKOFF_MS)).await;
            }
        }
    }
}

async fn wait_for_secure_link(conn: &Connection) -> bool {
    for _ in 0..config::SECURE_LINK_POLLS {
        match conn.security_mode() {
            SecurityMode::NoAccess | SecurityMode::Open => {
                Timer::after(Duration::from_millis(config::SECURE_LINK_POLL_MS)).await
            }
            _ => return true,
        }
    }
    false
}

/// AMS and CTS are only readable over an encrypted link. A bonded phone
/// encrypts on its own; otherwise ask it to pair.
async fn secure_link(conn: &Connection) -> Result<(), Error> {
    if matches!(conn.security_mode(), SecurityMode::NoAccess | SecurityMode::Open)
        && conn.request_pairing().is_err()
    {
        return Err(BleError::SecurityFailed.into());
    }
    if wait_for_secure_link(conn).await {
        Ok(())
    } else {
        Err(BleError::SecurityFailed.into())
    }
}

async fn connect_and_run(
    sd: &'static Softdevice,
    bonder: &'static Bonder,
    ctx: &BleContext,
) -> Result<(), Error> {
    let conn = advertiser::advertise(sd, bonder).await?;

    let params = raw::ble_gap_conn_params_t {
        min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
        max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
        slave_latency: config::BLE_SLAVE_LATENCY,
        conn_sup_timeout: config::BLE_SUP_TIMEOUT,
    };
    if conn.set_conn_params(params).is_err() {
        warn!("Connection parameter update rejected");
    }

    if let Err(e) = secure_link(&conn).await {
        warn!("Failed to secure BLE link");
        let _ = conn.disconnect();
        return Err(e);
    }
    ctx.events.send(BleEvent::Connected).await;

    let sample = cts_client::read_clock(&conn).await;
    ctx.clock.lock(|cell| cell.set(sample));

    let client = match ams_gatt::discover(&conn).await {
        Ok(client) => client,
        Err(e) => {
            let _ = conn.disconnect();
            return Err(e);
        }
    };

    let result =
        ams_gatt::run_session(&conn, &client, ctx.store, &ctx.buttons, ctx.redraw).await;
    if result.is_err() {
        let _ = conn.disconnect();
    }
    result
}
