//! roomcast chat server.
//!
//! Accepts WebSocket connections on `/ws`, admits them into a single chat room
//! and fans out every message to all other members of that room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server
//! cargo run --bin roomcast-server -- --host 0.0.0.0 --port 3000 --room lobby
//! ```

use std::sync::Arc;

use clap::Parser;
use roomcast_server::{
    domain::{Room, RoomId, Timestamp},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry},
    ui::Server,
    usecase::{BroadcastMessageUseCase, GetRoomDetailUseCase, JoinRoomUseCase, LeaveRoomUseCase},
};
use roomcast_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "roomcast-server")]
#[command(about = "WebSocket chat room broadcaster", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ROOMCAST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ROOMCAST_PORT", default_value = "8080")]
    port: u16,

    /// Name of the room every connection joins
    #[arg(long, env = "ROOMCAST_ROOM", default_value = "chat-room")]
    room: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let room_id = RoomId::new(args.room);

    // 1. Create Registry (in-memory) with the single fixed room
    let room = Room::new(room_id.clone(), Timestamp::new(clock.now_millis()));
    tracing::info!("Room '{}' created!", room.id);
    let registry = Arc::new(InMemoryRoomRegistry::with_room(room));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock.clone(),
        room_id,
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let broadcast_message_usecase = Arc::new(BroadcastMessageUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock,
    ));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(registry));

    // 4. Create and run the server
    let server = Server::new(
        join_room_usecase,
        leave_room_usecase,
        broadcast_message_usecase,
        get_room_detail_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
