use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use pickup_routing::config::environment::EnvironmentConfig;
use pickup_routing::database;
use pickup_routing::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("🚚 Coordinador de Rutas de Retiro");
    info!("=================================");

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    if let Err(e) = database::run_migrations(&pool).await {
        error!("❌ Error ejecutando migraciones: {}", e);
        return Err(anyhow::anyhow!("Error de migraciones: {}", e));
    }

    let config = EnvironmentConfig::default();
    let port = config.port;
    let app_state = AppState::new(pool, config);

    let app = pickup_routing::build_app(app_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("📋 Planillas de retiro:");
    info!("   GET  /pickups?start_date&end_date - Listar planillas con asignaciones");
    info!("   POST /pickups - Crear/extender planilla de un chofer");
    info!("   POST /pickups/runs/:id/assignments - Agregar asignaciones");
    info!("   POST /pickups/runs/:id/copy - Copy-forward a fechas futuras");
    info!("   PUT  /pickups/runs/:id/reassign - Reasignar planilla completa");
    info!("   PUT  /pickups/runs/:id/inform - Marcar chofer notificado");
    info!("   DELETE /pickups/runs/:id - Eliminar planilla");
    info!("   PUT  /pickups/assignments/:id - Editar costo / reasignar");
    info!("   DELETE /pickups/assignments/:id - Eliminar asignación");
    info!("🚗 Auto-servicio del chofer:");
    info!("   GET  /pickups/driver/today - Planillas del chofer para hoy");
    info!("   PUT  /pickups/assignments/:id/status - Marcar progreso");
    info!("   GET  /pickups/colectas/available - Pool de colectas reclamables");
    info!("   POST /pickups/colectas/claim - Reclamar un candidato");
    info!("   POST /assignments/complete - Finalizar retiro (bridge legado)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
