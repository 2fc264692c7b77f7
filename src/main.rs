use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use gym_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );
    let identity_service = IdentityService::new(pool.clone(), jwt_service.clone());

    // 创建服务
    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        identity_service.clone(),
        config.auth.bcrypt_cost,
    );
    let plan_service = PlanService::new(pool.clone());
    let subscription_service =
        SubscriptionService::new(pool.clone(), identity_service.clone(), plan_service.clone());
    let class_service = ClassService::new(
        pool.clone(),
        identity_service.clone(),
        config.scheduling.require_hired_trainer,
    );
    let attendance_service = AttendanceService::new(pool.clone(), identity_service.clone());
    let staff_service = StaffService::new(pool.clone(), identity_service.clone());
    let facility_service = FacilityService::new(pool.clone(), identity_service.clone());
    let equipment_service = EquipmentService::new(pool.clone(), identity_service.clone());
    let report_service = ReportService::new(pool.clone(), identity_service.clone());
    let dashboard_service = DashboardService::new(
        pool.clone(),
        identity_service.clone(),
        subscription_service.clone(),
    );

    // 预置套餐与管理员账号，已存在则跳过 (写入时服务内部记日志)
    if let Err(e) = plan_service.seed_defaults().await {
        log::error!("Failed to seed membership plans: {:?}", e);
    }
    if let Err(e) = auth_service
        .seed_admin(&config.seed.admin_email, &config.seed.admin_password)
        .await
    {
        log::error!("Failed to seed admin account: {:?}", e);
    }

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(plan_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(web::Data::new(class_service.clone()))
            .app_data(web::Data::new(attendance_service.clone()))
            .app_data(web::Data::new(staff_service.clone()))
            .app_data(web::Data::new(facility_service.clone()))
            .app_data(web::Data::new(equipment_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .configure(swagger_config)
            .configure(handlers::auth_config)
            .configure(handlers::plan_config)
            .configure(handlers::subscription_config)
            .configure(handlers::class_config)
            .configure(handlers::attendance_config)
            .configure(handlers::report_config)
            .configure(handlers::admin_config)
            .configure(handlers::facility_config)
            .configure(handlers::equipment_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
