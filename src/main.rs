// ==========================================
// 卫星过境排程系统 - 命令行入口
// ==========================================
// 用法:
//   pass-scheduler [--db <path>] <command> [args...]
//
// 命令:
//   init                                   初始化数据库
//   health                                 数据库连通性检查
//   stats                                  排程统计
//   list [ground_station]                  过境列表
//   optimize                               优化排程
//   import <csv>                           导入候选过境
//   validate <norad> <station> <start> <end>
//   commit   <norad> <station> <start> <end>
//   satellite <norad> <name> [description] 登记卫星
//
// 输出均为 JSON
// ==========================================

use pass_scheduler::app::{get_default_db_path, AppState};
use pass_scheduler::db::{open_sqlite_connection, read_schema_version};
use serde::Serialize;
use std::error::Error;
use std::path::Path;

const USAGE: &str = "用法: pass-scheduler [--db <path>] <init|health|stats|list|optimize|import|validate|commit|satellite> [args...]";

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn required<'a>(args: &'a [String], idx: usize, name: &str) -> Result<&'a str, Box<dyn Error>> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| format!("缺少参数 <{}>\n{}", name, USAGE).into())
}

fn main() -> Result<(), Box<dyn Error>> {
    pass_scheduler::logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let db_path = if args.first().map(String::as_str) == Some("--db") {
        if args.len() < 2 {
            return Err(format!("--db 缺少路径\n{}", USAGE).into());
        }
        let path = args.remove(1);
        args.remove(0);
        path
    } else {
        get_default_db_path()
    };

    let Some(command) = args.first().cloned() else {
        return Err(USAGE.into());
    };
    let rest = &args[1..];

    tracing::info!("{} v{} - 数据库: {}", pass_scheduler::APP_NAME, pass_scheduler::VERSION, db_path);
    let state = AppState::new(db_path.clone())?;
    let api = state.schedule_api.clone();

    match command.as_str() {
        "init" => {
            let conn = open_sqlite_connection(&db_path)?;
            print_json(&serde_json::json!({
                "db_path": db_path,
                "schema_version": read_schema_version(&conn)?,
                "config": state.config_manager.load_scheduler_config()?,
            }))
        }
        "health" => print_json(&api.health_check()?),
        "stats" => print_json(&api.get_statistics()?),
        "list" => print_json(&api.list_passes(rest.first().map(String::as_str))?),
        "optimize" => print_json(&api.optimize_schedule()?),
        "import" => {
            let file = required(rest, 0, "csv")?;
            print_json(&api.import_candidates_csv(Path::new(file))?)
        }
        "validate" | "commit" => {
            let norad: i64 = required(rest, 0, "norad")?.parse()?;
            let station = required(rest, 1, "station")?;
            let start = required(rest, 2, "start")?;
            let end = required(rest, 3, "end")?;
            if command == "validate" {
                print_json(&api.validate_schedule(norad, station, start, end)?)
            } else {
                print_json(&api.commit_schedule(norad, station, start, end)?)
            }
        }
        "satellite" => {
            let norad: i64 = required(rest, 0, "norad")?.parse()?;
            let name = required(rest, 1, "name")?;
            let description = rest.get(2).map(String::as_str);
            let created = api.register_satellite(norad, name, description)?;
            print_json(&serde_json::json!({ "norad_id": norad, "created": created }))
        }
        other => Err(format!("未知命令: {}\n{}", other, USAGE).into()),
    }
}
