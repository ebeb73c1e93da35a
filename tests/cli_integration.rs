use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

// ─── helpers ───────────────────────────────────────────────────────

const ADMIN_EMAIL: &str = "alice@example.com";

struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create tempdir"),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("plano").expect("binary");
        cmd.current_dir(self.dir.path());
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut a: Vec<&str> = args.to_vec();
        a.push("--json");
        let output = self.cmd().args(&a).output().expect("run");
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("parse JSON failed: {e}\nstdout: {stdout}"))
    }

    fn run_ok(&self, args: &[&str]) -> Value {
        let v = self.run_json(args);
        assert_eq!(v["success"], true, "expected success=true: {v}");
        v
    }

    fn run_err(&self, args: &[&str]) -> Value {
        let v = self.run_json(args);
        assert_eq!(v["success"], false, "expected success=false: {v}");
        v
    }

    fn error_code(&self, args: &[&str]) -> String {
        let v = self.run_err(args);
        v["error"]["code"].as_str().expect("error code").to_string()
    }

    fn login(&self, email: &str) {
        let v = self.run_ok(&["auth", "request", email]);
        let code = v["data"]["code"].as_str().expect("code").to_string();
        self.run_ok(&["auth", "verify", email, &code]);
    }

    /// init + seeded admin, logged in.
    fn bootstrap(&self) {
        self.run_ok(&[
            "init",
            "--admin-name",
            "Alice",
            "--admin-email",
            ADMIN_EMAIL,
        ]);
        self.login(ADMIN_EMAIL);
    }

    /// Adds a second setor with one member user and returns the member email.
    fn add_member(&self, setor: &str, nome: &str, email: &str) -> String {
        self.run_ok(&["setor", "create", setor, "--cor", "#3ba97d"]);
        self.run_ok(&["user", "create", nome, "--email", email, "--setor", setor]);
        email.to_string()
    }

    fn task_id(v: &Value) -> String {
        v["data"]["task"]["id"].as_str().expect("task id").to_string()
    }
}

// ─── auth & bootstrap ──────────────────────────────────────────────

#[test]
fn init_seeds_admin_and_login_works() {
    let env = TestEnv::new();
    let v = env.run_ok(&[
        "init",
        "--admin-name",
        "Alice",
        "--admin-email",
        ADMIN_EMAIL,
    ]);
    assert_eq!(v["data"]["admin"]["is_admin"], true);

    env.login(ADMIN_EMAIL);
    let who = env.run_ok(&["auth", "whoami"]);
    assert_eq!(who["data"]["user"]["email"], ADMIN_EMAIL);
}

#[test]
fn commands_require_initialization() {
    let env = TestEnv::new();
    assert_eq!(env.error_code(&["task", "list"]), "NOT_INITIALIZED");
}

#[test]
fn request_code_for_unknown_email_fails() {
    let env = TestEnv::new();
    env.run_ok(&["init"]);
    assert_eq!(
        env.error_code(&["auth", "request", "nobody@example.com"]),
        "VALIDATION_ERROR"
    );
}

#[test]
fn whoami_without_session_fails() {
    let env = TestEnv::new();
    env.run_ok(&["init"]);
    assert_eq!(env.error_code(&["auth", "whoami"]), "NOT_AUTHENTICATED");
}

#[test]
fn wrong_code_is_rejected() {
    let env = TestEnv::new();
    env.run_ok(&[
        "init",
        "--admin-name",
        "Alice",
        "--admin-email",
        ADMIN_EMAIL,
    ]);
    env.run_ok(&["auth", "request", ADMIN_EMAIL]);
    assert_eq!(
        env.error_code(&["auth", "verify", ADMIN_EMAIL, "000000x"]),
        "INVALID_CODE"
    );
}

#[test]
fn logout_invalidates_session() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["auth", "logout"]);
    assert_eq!(env.error_code(&["auth", "whoami"]), "NOT_AUTHENTICATED");
}

#[test]
fn deactivated_user_cannot_request_a_code() {
    let env = TestEnv::new();
    env.bootstrap();
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");
    env.login(&member);
    env.run_ok(&["auth", "whoami"]);

    env.login(ADMIN_EMAIL);
    env.run_ok(&["user", "deactivate", &member]);
    assert_eq!(
        env.error_code(&["auth", "request", &member]),
        "VALIDATION_ERROR"
    );
    // Reactivation restores access.
    env.run_ok(&["user", "activate", &member]);
    env.login(&member);
    env.run_ok(&["auth", "whoami"]);
}

// ─── tasks & sequential ids ────────────────────────────────────────

#[test]
fn tasks_get_monotonic_sequential_ids() {
    let env = TestEnv::new();
    env.bootstrap();
    let a = env.run_ok(&["task", "add", "Primeira"]);
    let b = env.run_ok(&["task", "add", "Segunda"]);
    assert_eq!(a["data"]["task"]["sequential_id"], "ID001");
    assert_eq!(b["data"]["task"]["sequential_id"], "ID002");
}

#[test]
fn task_resolves_by_display_id() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Primeira"]);
    let v = env.run_ok(&["task", "show", "ID001"]);
    assert_eq!(v["data"]["task"]["title"], "Primeira");
}

#[test]
fn task_add_validates_inputs() {
    let env = TestEnv::new();
    env.bootstrap();
    assert_eq!(
        env.error_code(&["task", "add", "X", "--priority", "Urgente"]),
        "VALIDATION_ERROR"
    );
    assert_eq!(
        env.error_code(&["task", "add", "X", "--due", "31/12/2024"]),
        "VALIDATION_ERROR"
    );
    assert_eq!(env.error_code(&["task", "add", "  "]), "VALIDATION_ERROR");
}

#[test]
fn members_are_scoped_to_their_setor() {
    let env = TestEnv::new();
    env.bootstrap();
    let admin_task = env.run_ok(&["task", "add", "Tarefa do setor Geral"]);
    let admin_task_id = TestEnv::task_id(&admin_task);
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");

    env.login(&member);
    let list = env.run_ok(&["task", "list"]);
    assert_eq!(list["data"]["tasks"].as_array().unwrap().len(), 0);
    // Cross-setor access is indistinguishable from a missing task.
    assert_eq!(
        env.error_code(&["task", "show", &admin_task_id]),
        "NOT_FOUND"
    );

    env.run_ok(&["task", "add", "Tarefa de operações"]);
    let list = env.run_ok(&["task", "list"]);
    assert_eq!(list["data"]["tasks"].as_array().unwrap().len(), 1);

    env.login(ADMIN_EMAIL);
    let list = env.run_ok(&["task", "list"]);
    assert_eq!(list["data"]["tasks"].as_array().unwrap().len(), 2);
    let scoped = env.run_ok(&["task", "list", "--setor", "Operações"]);
    assert_eq!(scoped["data"]["tasks"].as_array().unwrap().len(), 1);
}

#[test]
fn task_delete_is_admin_only_and_needs_confirmation() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Descartável"]);
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");

    env.login(&member);
    assert_eq!(
        env.error_code(&["task", "delete", "ID001", "--yes"]),
        "UNAUTHORIZED"
    );

    env.login(ADMIN_EMAIL);
    assert_eq!(env.error_code(&["task", "delete", "ID001"]), "VALIDATION_ERROR");
    env.run_ok(&["task", "delete", "ID001", "--yes"]);
    assert_eq!(env.error_code(&["task", "show", "ID001"]), "NOT_FOUND");
}

// ─── confirmation workflow ─────────────────────────────────────────

#[test]
fn completion_request_leaves_status_untouched() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Revisão", "--status", "Em andamento"]);
    let v = env.run_ok(&["task", "request-completion", "ID001", "--notes", "pronto"]);
    assert_eq!(v["data"]["task"]["status"], "Em andamento");
    assert_eq!(v["data"]["task"]["confirmation_status"], "pending");
    assert_eq!(v["data"]["requested_by"], ADMIN_EMAIL);
}

#[test]
fn approve_sets_status_concluido() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Revisão", "--status", "Bloqueado"]);
    env.run_ok(&["task", "request-completion", "ID001"]);
    let v = env.run_ok(&["approvals", "approve", "ID001", "--notes", "ok"]);
    assert_eq!(v["data"]["task"]["status"], "Concluído");
    assert_eq!(v["data"]["task"]["confirmation_status"], "approved");
    assert_eq!(v["data"]["admin_notes"], "ok");
}

#[test]
fn reject_returns_status_to_em_andamento_and_allows_rerequest() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Revisão", "--status", "Backlog"]);
    env.run_ok(&["task", "request-completion", "ID001"]);
    let v = env.run_ok(&["approvals", "reject", "ID001", "--notes", "refazer"]);
    assert_eq!(v["data"]["task"]["status"], "Em andamento");
    assert_eq!(v["data"]["task"]["confirmation_status"], "rejected");

    // The rejection record persists until a new request is filed.
    let shown = env.run_ok(&["task", "show", "ID001"]);
    assert_eq!(shown["data"]["task"]["confirmation_status"], "rejected");
    assert_eq!(shown["data"]["task"]["admin_notes"], "refazer");

    let v = env.run_ok(&["task", "request-completion", "ID001"]);
    assert_eq!(v["data"]["task"]["confirmation_status"], "pending");
}

#[test]
fn approve_without_pending_request_fails() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Revisão"]);
    assert_eq!(
        env.error_code(&["approvals", "approve", "ID001"]),
        "NO_PENDING_REQUEST"
    );
    assert_eq!(
        env.error_code(&["approvals", "reject", "ID001"]),
        "NO_PENDING_REQUEST"
    );
}

#[test]
fn non_admin_cannot_resolve_and_nothing_is_mutated() {
    let env = TestEnv::new();
    env.bootstrap();
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");

    env.login(&member);
    env.run_ok(&["task", "add", "Tarefa", "--status", "Em andamento"]);
    env.run_ok(&["task", "request-completion", "ID001"]);
    assert_eq!(
        env.error_code(&["approvals", "approve", "ID001"]),
        "UNAUTHORIZED"
    );
    assert_eq!(
        env.error_code(&["approvals", "reject", "ID001"]),
        "UNAUTHORIZED"
    );
    let shown = env.run_ok(&["task", "show", "ID001"]);
    assert_eq!(shown["data"]["task"]["status"], "Em andamento");
    assert_eq!(shown["data"]["task"]["confirmation_status"], "pending");
}

#[test]
fn pending_list_resolves_requester_name() {
    let env = TestEnv::new();
    env.bootstrap();
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");

    env.login(&member);
    env.run_ok(&["task", "add", "Tarefa"]);
    env.run_ok(&["task", "request-completion", "ID001", "--notes", "feito"]);

    env.login(ADMIN_EMAIL);
    let v = env.run_ok(&["approvals", "list"]);
    let pending = v["data"]["pending"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["solicitante_nome"], "Bruno");
    assert_eq!(pending[0]["requested_by"], "bruno@example.com");
    assert_eq!(pending[0]["notes"], "feito");
}

#[test]
fn approval_queue_is_admin_only() {
    let env = TestEnv::new();
    env.bootstrap();
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");
    env.login(&member);
    assert_eq!(env.error_code(&["approvals", "list"]), "UNAUTHORIZED");
    assert_eq!(env.error_code(&["approvals", "count"]), "UNAUTHORIZED");
}

#[test]
fn approvals_count_tracks_pending_requests() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "A"]);
    env.run_ok(&["task", "add", "B"]);
    env.run_ok(&["task", "request-completion", "ID001"]);
    env.run_ok(&["task", "request-completion", "ID002"]);
    let v = env.run_ok(&["approvals", "count"]);
    assert_eq!(v["data"]["count"], 2);

    env.run_ok(&["approvals", "approve", "ID001"]);
    let v = env.run_ok(&["approvals", "count"]);
    assert_eq!(v["data"]["count"], 1);
}

// ─── setores & users ───────────────────────────────────────────────

#[test]
fn setor_name_uniqueness_is_prechecked() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["setor", "create", "Operações", "--cor", "#3ba97d"]);
    assert_eq!(
        env.error_code(&["setor", "create", "Operações", "--cor", "#2586b6"]),
        "VALIDATION_ERROR"
    );
}

#[test]
fn setor_color_must_be_hex() {
    let env = TestEnv::new();
    env.bootstrap();
    assert_eq!(
        env.error_code(&["setor", "create", "Operações", "--cor", "azul"]),
        "VALIDATION_ERROR"
    );
}

#[test]
fn setor_delete_blocked_while_referenced() {
    let env = TestEnv::new();
    env.bootstrap();
    env.add_member("Operações", "Bruno", "bruno@example.com");
    assert_eq!(
        env.error_code(&["setor", "delete", "Operações", "--yes"]),
        "DEPENDENCY_ERROR"
    );
    // The record survives the failed delete.
    let v = env.run_ok(&["setor", "list"]);
    let nomes: Vec<&str> = v["data"]["setores"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["nome"].as_str().unwrap())
        .collect();
    assert!(nomes.contains(&"Operações"));
}

#[test]
fn empty_setor_can_be_deleted() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["setor", "create", "Temporário", "--cor", "#bfa13b"]);
    env.run_ok(&["setor", "delete", "Temporário", "--yes"]);
    assert_eq!(
        env.error_code(&["setor", "delete", "Temporário", "--yes"]),
        "NOT_FOUND"
    );
}

#[test]
fn user_email_uniqueness_is_prechecked() {
    let env = TestEnv::new();
    env.bootstrap();
    env.add_member("Operações", "Bruno", "bruno@example.com");
    assert_eq!(
        env.error_code(&[
            "user", "create", "Outro", "--email", "bruno@example.com", "--setor", "Operações"
        ]),
        "VALIDATION_ERROR"
    );
}

#[test]
fn user_delete_blocked_while_tasks_assigned() {
    let env = TestEnv::new();
    env.bootstrap();
    env.add_member("Operações", "Bruno", "bruno@example.com");
    env.run_ok(&["task", "add", "Tarefa", "--assignee", "Bruno"]);
    assert_eq!(
        env.error_code(&["user", "delete", "bruno@example.com", "--yes"]),
        "DEPENDENCY_ERROR"
    );
}

#[test]
fn user_management_is_admin_only() {
    let env = TestEnv::new();
    env.bootstrap();
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");
    env.login(&member);
    assert_eq!(
        env.error_code(&[
            "user", "create", "Carla", "--email", "carla@example.com", "--setor", "Operações"
        ]),
        "UNAUTHORIZED"
    );
    assert_eq!(
        env.error_code(&["setor", "create", "Novo", "--cor", "#123abc"]),
        "UNAUTHORIZED"
    );
}

// ─── filtering ─────────────────────────────────────────────────────

#[test]
fn tags_only_search_matches_tags_not_titles() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Fix bug", "--tag", "infra"]);
    env.run_ok(&["task", "add", "Write docs", "--tag", "infra", "--tag", "urgent"]);

    let v = env.run_ok(&["task", "list", "--search", "infra", "--tags-only"]);
    assert_eq!(v["data"]["tasks"].as_array().unwrap().len(), 2);

    let v = env.run_ok(&["task", "list", "--search", "fix", "--tags-only"]);
    assert_eq!(v["data"]["tasks"].as_array().unwrap().len(), 0);

    let v = env.run_ok(&["task", "list", "--search", "fix"]);
    assert_eq!(v["data"]["tasks"].as_array().unwrap().len(), 1);
}

#[test]
fn list_filters_are_anded() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "A", "--priority", "Alta", "--status", "Backlog"]);
    env.run_ok(&["task", "add", "B", "--priority", "Alta", "--status", "Em andamento"]);
    env.run_ok(&["task", "add", "C", "--priority", "Baixa", "--status", "Em andamento"]);

    let v = env.run_ok(&[
        "task", "list", "--priority", "Alta", "--status", "Em andamento",
    ]);
    let tasks = v["data"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "B");
}

// ─── attachments ───────────────────────────────────────────────────

#[test]
fn attachments_with_invalid_scheme_are_not_listed() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Com anexos"]);
    env.run_ok(&[
        "task", "attach", "add", "ID001", "--name", "foto.png",
        "--url", "data:image/png;base64,iVBORw0KGgo=",
    ]);
    env.run_ok(&[
        "task", "attach", "add", "ID001", "--name", "legado.doc", "--url", "ftp://x",
    ]);

    let v = env.run_ok(&["task", "attach", "list", "ID001"]);
    let attachments = v["data"]["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["name"], "foto.png");

    let shown = env.run_ok(&["task", "show", "ID001"]);
    assert_eq!(shown["data"]["task"]["attachments"].as_array().unwrap().len(), 1);
}

#[test]
fn member_cannot_remove_another_setors_attachment() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Tarefa do setor Geral"]);
    let v = env.run_ok(&[
        "task", "attach", "add", "ID001", "--name", "doc.pdf",
        "--url", "https://example.com/doc.pdf",
    ]);
    let attachment_id = v["data"]["attachment"]["id"].as_str().unwrap().to_string();
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");

    env.login(&member);
    assert_eq!(env.error_code(&["task", "show", "ID001"]), "NOT_FOUND");
    assert_eq!(
        env.error_code(&["task", "attach", "remove", &attachment_id]),
        "NOT_FOUND"
    );

    // The row survives and the owner can still remove it.
    env.login(ADMIN_EMAIL);
    let v = env.run_ok(&["task", "attach", "list", "ID001"]);
    assert_eq!(v["data"]["attachments"].as_array().unwrap().len(), 1);
    env.run_ok(&["task", "attach", "remove", &attachment_id]);
    assert_eq!(
        env.error_code(&["task", "attach", "remove", &attachment_id]),
        "NOT_FOUND"
    );
}

#[test]
fn attach_set_replaces_the_whole_set() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Com anexos"]);
    env.run_ok(&[
        "task", "attach", "add", "ID001", "--name", "velho.pdf",
        "--url", "https://example.com/velho.pdf",
    ]);
    env.run_ok(&[
        "task", "attach", "add", "ID001", "--name", "outro.pdf",
        "--url", "https://example.com/outro.pdf",
    ]);

    let v = env.run_ok(&[
        "task", "attach", "set", "ID001",
        "--file", "novo.png=data:image/png;base64,iVBORw0KGgo=",
    ]);
    assert_eq!(v["data"]["saved"], 1);
    let attachments = v["data"]["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["name"], "novo.png");

    // An empty set clears the task's attachments.
    env.run_ok(&["task", "attach", "set", "ID001"]);
    let v = env.run_ok(&["task", "attach", "list", "ID001"]);
    assert_eq!(v["data"]["attachments"].as_array().unwrap().len(), 0);

    assert_eq!(
        env.error_code(&["task", "attach", "set", "ID001", "--file", "sem-url"]),
        "VALIDATION_ERROR"
    );
}

// ─── exports & status ──────────────────────────────────────────────

#[test]
fn export_json_writes_document() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "A", "--tag", "infra"]);
    env.run_ok(&["task", "add", "B"]);

    let v = env.run_ok(&["export", "json", "--out", "dump.json"]);
    assert_eq!(v["data"]["tasks"], 2);

    let raw = fs::read_to_string(env.dir.path().join("dump.json")).expect("read export");
    let doc: Value = serde_json::from_str(&raw).expect("parse export");
    assert_eq!(doc["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(doc["exported_by"], ADMIN_EMAIL);
    assert_eq!(doc["tasks"][0]["sequential_id"], "ID001");
}

#[test]
fn export_list_sorts_by_due_date_with_missing_last() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Meio", "--due", "2024-06-01"]);
    env.run_ok(&["task", "add", "Sem prazo"]);
    env.run_ok(&["task", "add", "Cedo", "--due", "2024-01-15"]);

    env.run_ok(&["export", "list", "--out", "lista.txt"]);
    let report = fs::read_to_string(env.dir.path().join("lista.txt")).expect("read report");
    let cedo = report.find("Cedo").expect("Cedo in report");
    let meio = report.find("Meio").expect("Meio in report");
    let sem = report.find("Sem prazo").expect("Sem prazo in report");
    assert!(cedo < meio && meio < sem, "order wrong:\n{report}");
    assert!(report.starts_with("Lista de Atividades Filtradas"));
}

#[test]
fn status_reports_counts_and_admin_badge() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "A", "--status", "Em andamento", "--priority", "Crítica"]);
    env.run_ok(&["task", "add", "B", "--status", "Concluído"]);
    env.run_ok(&["task", "add", "C", "--due", "2000-01-01"]);
    env.run_ok(&["task", "request-completion", "ID001"]);

    let v = env.run_ok(&["status"]);
    let counts = &v["data"]["counts"];
    assert_eq!(counts["total"], 3);
    assert_eq!(counts["em_andamento"], 1);
    assert_eq!(counts["concluido"], 1);
    assert_eq!(counts["alta"], 1);
    assert_eq!(counts["atrasadas"], 1);
    assert_eq!(v["data"]["pending_approvals"], 1);

    // Members get counters for their own setor and no approval badge.
    let member = env.add_member("Operações", "Bruno", "bruno@example.com");
    env.login(&member);
    let v = env.run_ok(&["status"]);
    assert_eq!(v["data"]["counts"]["total"], 0);
    assert!(v["data"].get("pending_approvals").is_none());
}

#[test]
fn text_output_prints_task_list() {
    let env = TestEnv::new();
    env.bootstrap();
    env.run_ok(&["task", "add", "Tarefa visível"]);
    env.cmd()
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tarefa visível"))
        .stdout(predicate::str::contains("ID001"));
}
