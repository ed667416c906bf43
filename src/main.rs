use rocket::*;

use config::Config;
use cors::Cors;
use database::DatabasePool;

mod config;
mod cors;
mod database;

#[launch]
async fn rocket() -> _ {
    // Resolve configuration and connect to the database before serving
    // anything: a missing DATABASE_URL should kill the process at startup,
    // not fail every request.
    dotenv::dotenv().ok();
    let config = Config::from_env().expect("invalid server configuration");

    let database_pool = database::connect(&config)
        .await
        .expect("failed to connect to the highscore database");

    build(database_pool)
}

fn build(database_pool: DatabasePool) -> Rocket<Build> {
    rocket::build()
        .mount(
            "/",
            routes![
                index,
                database::requests::add_score,
                database::requests::preflight_scores,
                database::requests::get_scores,
                database::requests::live,
                database::requests::ready,
            ],
        )
        .attach(Cors)
        .manage::<DatabasePool>(database_pool)
}

#[get("/")]
fn index() -> &'static str {
    "This is an online highscore server!"
}
