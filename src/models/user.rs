use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub setor_id: String,
    pub is_admin: bool,
    pub ativo: bool,
    pub created_at: String,
    pub updated_at: String,
}
