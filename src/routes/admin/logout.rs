use actix_web::HttpResponse;

use crate::routes::MessageBody;
use crate::session_state::TypedSession;

pub async fn log_out(session: TypedSession) -> HttpResponse {
    session.log_out();
    HttpResponse::Ok().json(MessageBody::new("You have successfully logged out."))
}
