use std::collections::VecDeque;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use enkinet::{FrameKind, SessionError, SnapshotSchedule, World, WorldSync, write_frame};

use crate::config::ServerConfig;
use crate::events::{DisconnectReason, ServerEvent};
use crate::simulation::Simulation;

struct Client {
    client_id: u32,
    addr: SocketAddr,
    /// Non-blocking; bytes the socket did not take wait in `backlog`.
    stream: TcpStream,
    backlog: Vec<u8>,
    schedule: SnapshotSchedule,
}

impl Client {
    /// Queues one frame and writes as much of the backlog as the socket
    /// accepts without blocking.
    fn send(
        &mut self,
        kind: FrameKind,
        payload: &str,
        max_backlog: usize,
    ) -> Result<(), DisconnectReason> {
        if let Err(e) = self.queue(kind, payload) {
            log::debug!(
                "write to client {} ({}) failed: {}",
                self.client_id,
                self.addr,
                e
            );
            return Err(DisconnectReason::WriteFailed);
        }
        if self.backlog.len() > max_backlog {
            log::debug!(
                "client {} ({}) has {} unsent bytes",
                self.client_id,
                self.addr,
                self.backlog.len()
            );
            return Err(DisconnectReason::TooSlow);
        }
        Ok(())
    }

    fn queue(&mut self, kind: FrameKind, payload: &str) -> Result<(), SessionError> {
        write_frame(&mut self.backlog, kind, payload)?;
        self.flush_backlog()?;
        Ok(())
    }

    fn flush_backlog(&mut self) -> io::Result<()> {
        let mut written = 0;
        while written < self.backlog.len() {
            match self.stream.write(&self.backlog[written..]) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => written += n,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        self.backlog.drain(..written);
        Ok(())
    }
}

/// Per-tick frames, encoded at most once each whatever the client count.
#[derive(Default)]
struct TickFrames {
    snapshot: Option<String>,
    delta: Option<String>,
}

impl TickFrames {
    fn get(&mut self, kind: FrameKind, sync: &WorldSync, world: &World) -> &str {
        let slot = match kind {
            FrameKind::Snapshot => &mut self.snapshot,
            FrameKind::Delta => &mut self.delta,
        };
        slot.get_or_insert_with(|| match kind {
            FrameKind::Snapshot => sync.encode_snapshot(world),
            FrameKind::Delta => sync.encode_delta(world),
        })
    }
}

pub struct WorldServer {
    listener: TcpListener,
    config: ServerConfig,
    world: World,
    simulation: Simulation,
    sync: WorldSync,
    clients: Vec<Client>,
    next_client_id: u32,
    frames_sent: u64,
    tick: u64,
    tick_duration: Duration,
    last_tick_time: Instant,
    accumulator: Duration,
    pending_events: VecDeque<ServerEvent>,
}

impl WorldServer {
    pub fn new(bind_addr: &str, config: ServerConfig, world: World) -> io::Result<Self> {
        let listener = TcpListener::bind(bind_addr)?;
        listener.set_nonblocking(true)?;
        let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate.max(1) as f64);

        Ok(Self {
            listener,
            world,
            simulation: Simulation::new(),
            sync: WorldSync::new(config.sync.clone()),
            clients: Vec::new(),
            next_client_id: 1,
            frames_sent: 0,
            tick: 0,
            tick_duration,
            last_tick_time: Instant::now(),
            accumulator: Duration::ZERO,
            pending_events: VecDeque::new(),
            config,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.pending_events.drain(..)
    }

    /// Runs forever, or until `max_ticks` ticks have elapsed.
    pub fn run(&mut self, max_ticks: Option<u64>) {
        loop {
            self.tick_once();
            for event in self.drain_events() {
                event.log();
            }
            if max_ticks.is_some_and(|max| self.tick >= max) {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        self.shutdown_connections();
        for event in self.drain_events() {
            event.log();
        }
    }

    pub fn shutdown_connections(&mut self) {
        for client in self.clients.drain(..) {
            let _ = client.stream.shutdown(std::net::Shutdown::Both);
            self.pending_events.push_back(ServerEvent::ClientDisconnected {
                client_id: client.client_id,
                reason: DisconnectReason::Shutdown,
            });
        }
    }

    pub fn tick_once(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_tick_time;
        self.last_tick_time = now;
        self.accumulator += delta;

        if let Err(e) = self.accept_clients() {
            self.pending_events.push_back(ServerEvent::Error {
                message: format!("Accept failed: {}", e),
            });
        }

        while self.accumulator >= self.tick_duration {
            self.accumulator -= self.tick_duration;
            self.step();
        }
    }

    /// Advances the simulation one tick and sends every client its frame.
    pub fn step(&mut self) {
        let dt = self.tick_duration.as_secs_f64();
        self.simulation.step(&mut self.world, dt);
        self.tick += 1;
        self.broadcast();
    }

    fn broadcast(&mut self) {
        let mut frames = TickFrames::default();
        let mut failed = Vec::new();
        let max_backlog = self.config.max_backlog_bytes;

        for client in &mut self.clients {
            let kind = client.schedule.next_kind();
            let payload = frames.get(kind, &self.sync, &self.world);
            match client.send(kind, payload, max_backlog) {
                Ok(()) => self.frames_sent += 1,
                Err(reason) => failed.push((client.client_id, reason)),
            }
        }

        if !failed.is_empty() {
            self.clients
                .retain(|c| !failed.iter().any(|(id, _)| *id == c.client_id));
            for (client_id, reason) in failed {
                self.pending_events
                    .push_back(ServerEvent::ClientDisconnected { client_id, reason });
            }
        }
    }

    fn accept_clients(&mut self) -> io::Result<()> {
        loop {
            let (stream, addr) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e),
            };

            if self.client_count() >= self.config.max_clients {
                self.pending_events.push_back(ServerEvent::ConnectionDenied {
                    addr,
                    reason: format!("server full ({} clients)", self.config.max_clients),
                });
                continue;
            }

            stream.set_nonblocking(true)?;
            stream.set_nodelay(true)?;

            let client_id = self.next_client_id;
            self.next_client_id += 1;
            self.clients.push(Client {
                client_id,
                addr,
                stream,
                backlog: Vec::new(),
                schedule: SnapshotSchedule::new(self.config.snapshot_interval),
            });
            self.pending_events
                .push_back(ServerEvent::ClientConnected { client_id, addr });
        }
    }

    /// Frames handed to clients since startup, sent or still queued.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use enkinet::{FrameReader, SyncConfig};

    use super::*;

    fn test_server() -> WorldServer {
        let mut world = World::square(100.0, 100.0, enkinet::Color::GRAY);
        world.add_object(enkinet::Thymio2::new());
        let config = ServerConfig {
            snapshot_interval: 3,
            sync: SyncConfig::default(),
            ..Default::default()
        };
        WorldServer::new("127.0.0.1:0", config, world).unwrap()
    }

    fn accept_one(server: &mut WorldServer) {
        for _ in 0..200 {
            server.accept_clients().unwrap();
            if server.client_count() == 1 {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("client never accepted");
    }

    #[test]
    fn new_client_gets_snapshot_then_deltas() {
        let mut server = test_server();
        let stream = TcpStream::connect(server.local_addr().unwrap()).unwrap();
        accept_one(&mut server);

        for _ in 0..4 {
            server.step();
        }

        let mut reader = FrameReader::new(BufReader::new(stream));
        let kinds: Vec<FrameKind> = (0..4)
            .map(|_| reader.next_frame().unwrap().unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                FrameKind::Snapshot,
                FrameKind::Delta,
                FrameKind::Delta,
                FrameKind::Snapshot
            ]
        );
        assert_eq!(server.frames_sent(), 4);
    }

    #[test]
    fn closed_client_is_dropped() {
        let mut server = test_server();
        let stream = TcpStream::connect(server.local_addr().unwrap()).unwrap();
        accept_one(&mut server);
        drop(stream);

        for _ in 0..50 {
            server.step();
            if server.client_count() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(server.client_count(), 0);
        assert!(server.drain_events().any(|e| matches!(
            e,
            ServerEvent::ClientDisconnected {
                reason: DisconnectReason::WriteFailed,
                ..
            }
        )));
    }

    #[test]
    fn stalled_reader_dropped_without_blocking_ticks() {
        let mut world = World::square(100.0, 100.0, enkinet::Color::GRAY);
        world.ground_texture =
            enkinet::GroundTexture::new(256, 256, vec![0xFF80_8080; 256 * 256]).unwrap();
        world.add_object(enkinet::Thymio2::new());
        let config = ServerConfig {
            snapshot_interval: 1,
            max_backlog_bytes: 64 * 1024,
            ..Default::default()
        };
        let mut server = WorldServer::new("127.0.0.1:0", config, world).unwrap();
        let _stalled = TcpStream::connect(server.local_addr().unwrap()).unwrap();
        accept_one(&mut server);

        let mut steps = 0;
        while server.client_count() == 1 && steps < 2000 {
            let started = Instant::now();
            server.step();
            assert!(started.elapsed() < Duration::from_secs(1));
            steps += 1;
        }

        assert_eq!(server.client_count(), 0);
        assert!(server.drain_events().any(|e| matches!(
            e,
            ServerEvent::ClientDisconnected {
                reason: DisconnectReason::TooSlow,
                ..
            }
        )));
    }

    #[test]
    fn full_server_denies() {
        let mut server = test_server();
        server.config.max_clients = 1;
        let _first = TcpStream::connect(server.local_addr().unwrap()).unwrap();
        accept_one(&mut server);
        let _second = TcpStream::connect(server.local_addr().unwrap()).unwrap();

        let mut denied = false;
        for _ in 0..200 {
            server.accept_clients().unwrap();
            if server
                .drain_events()
                .any(|e| matches!(e, ServerEvent::ConnectionDenied { .. }))
            {
                denied = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(denied);
        assert_eq!(server.client_count(), 1);
    }
}
