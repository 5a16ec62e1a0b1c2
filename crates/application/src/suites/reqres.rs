//! The reqres.in API suite.
//!
//! Fixture-pinned cases against the public reqres mock service: values such
//! as user emails and color counts match the dataset it serves.

use std::time::Duration;

use reqcheck_domain::{
    DomainResult, Expectation, JsonKind, PropertyPath, StatusClass, TestCase,
};
use serde_json::json;

use crate::ports::Clock;

/// Default base URL of the hosted service.
pub const REQRES_BASE_URL: &str = "https://reqres.in";

const USER_KEYS: [&str; 5] = ["id", "email", "first_name", "last_name", "avatar"];
const COLOR_KEYS: [&str; 5] = ["id", "name", "year", "color", "pantone_value"];

/// Timeout for the intentionally delayed users endpoint.
const DELAYED_TIMEOUT: Duration = Duration::from_millis(7000);

fn p(path: &str) -> DomainResult<PropertyPath> {
    PropertyPath::parse(path)
}

/// Builds every reqres test case in declaration order.
///
/// Timestamps returned by create/update endpoints must contain today's UTC
/// date as reported by `clock`.
///
/// # Errors
///
/// Returns an error only if one of the built-in property paths fails to parse.
pub fn reqres_suite(clock: &dyn Clock) -> DomainResult<Vec<TestCase>> {
    let today = clock.today();
    let mut cases = Vec::new();
    cases.extend(user_reads()?);
    cases.extend(colors()?);
    cases.extend(user_writes(&today)?);
    cases.extend(register()?);
    cases.extend(login()?);
    cases.push(delayed_users()?);
    Ok(cases)
}

fn user_reads() -> DomainResult<Vec<TestCase>> {
    Ok(vec![
        TestCase::get("get single user: should get a user by userId", "/api/users/3")
            .expect(Expectation::status(200))
            .expect(Expectation::header("Content-Type", "json"))
            .expect(Expectation::IsJson)
            .expect(Expectation::property_eq(p("data.id")?, 3))
            .expect(Expectation::property_eq(p("data.email")?, "emma.wong@reqres.in"))
            .expect(Expectation::property_eq(p("data.first_name")?, "Emma"))
            .expect(Expectation::property_eq(p("data.last_name")?, "Wong"))
            .expect(Expectation::property_eq(
                p("data.avatar")?,
                "https://reqres.in/img/faces/3-image.jpg",
            ))
            .expect(Expectation::is_object(p("support")?)),
        TestCase::get("get single user: should NOT get a user by userId", "/api/users/23")
            .expect(Expectation::status(404))
            .expect(Expectation::BodyIsEmpty)
            .expect(Expectation::status_is(StatusClass::NotFound)),
        TestCase::get("get users: should get list of users based on its page", "/api/users")
            .with_query("page", 1)
            .expect(Expectation::status(200))
            .expect(Expectation::header("Content-Type", "json"))
            .expect(Expectation::property_eq(p("page")?, 1))
            .expect(Expectation::is_array(p("data")?))
            .expect(Expectation::element_keys(p("data")?, 0, USER_KEYS)),
    ])
}

fn colors() -> DomainResult<Vec<TestCase>> {
    Ok(vec![
        TestCase::get("get colors: should get list of colors by its param", "/api/color")
            .with_query("page", 2)
            .expect(Expectation::status(200))
            .expect(Expectation::status_is(StatusClass::Ok))
            .expect(Expectation::property_eq(p("page")?, 2))
            .expect(Expectation::property_type(p("page")?, JsonKind::Number))
            .expect(Expectation::property_eq(p("per_page")?, 6))
            .expect(Expectation::property_type(p("per_page")?, JsonKind::Number))
            .expect(Expectation::property_eq(p("total")?, 12))
            .expect(Expectation::property_type(p("total")?, JsonKind::Number))
            .expect(Expectation::property_eq(p("total_pages")?, 2))
            .expect(Expectation::property_type(p("total_pages")?, JsonKind::Number))
            .expect(Expectation::is_array(p("data")?))
            .expect(Expectation::is_object(p("support")?)),
        TestCase::get("get single color: should get a color by its param", "/api/color/6")
            .expect(Expectation::status(200))
            .expect(Expectation::status_is(StatusClass::Ok))
            .expect(Expectation::is_object(p("data")?))
            .expect(Expectation::object_keys(p("data")?, COLOR_KEYS)),
        TestCase::get("get single color: should NOT get a color by its param", "/api/color/23")
            .expect(Expectation::status(404))
            .expect(Expectation::status_is_not(StatusClass::Ok))
            .expect(Expectation::status_is(StatusClass::NotFound))
            .expect(Expectation::BodyIsEmpty),
    ])
}

fn user_writes(today: &str) -> DomainResult<Vec<TestCase>> {
    Ok(vec![
        TestCase::post("create new user: should create an user", "/api/users")
            .with_body(json!({"name": "kiki", "job": "qa"}))
            .expect(Expectation::status(201))
            .expect(Expectation::IsJson)
            .expect(Expectation::is_object(PropertyPath::root()))
            .expect(Expectation::property_eq(p("name")?, "kiki"))
            .expect(Expectation::property_eq(p("job")?, "qa"))
            .expect(Expectation::property_type(p("id")?, JsonKind::String))
            .expect(Expectation::property_contains(p("createdAt")?, today)),
        TestCase::put(
            "update user using PUT: should update an user data by its userId",
            "/api/users/5",
        )
        .with_body(json!({"name": "sumantri", "job": "sdet"}))
        .expect(Expectation::status(200))
        .expect(Expectation::status_is(StatusClass::Ok))
        .expect(Expectation::header("Content-Type", "json"))
        .expect(Expectation::property_eq(p("name")?, "sumantri"))
        .expect(Expectation::property_eq(p("job")?, "sdet"))
        .expect(Expectation::property_contains(p("updatedAt")?, today)),
        TestCase::patch(
            "update user using PATCH: should update an user data by its userId",
            "/api/users/9",
        )
        .with_body(json!({"name": "kiki sumantri", "job": "it sqa"}))
        .expect(Expectation::status(200))
        .expect(Expectation::status_is(StatusClass::Ok))
        .expect(Expectation::IsJson)
        .expect(Expectation::property_eq(p("name")?, "kiki sumantri"))
        .expect(Expectation::property_eq(p("job")?, "it sqa"))
        .expect(Expectation::property_contains(p("updatedAt")?, today)),
        TestCase::delete(
            "remove user using DELETE: should delete an user data by its userId",
            "/api/users/11",
        )
        .expect(Expectation::status(204))
        .expect(Expectation::status_is(StatusClass::NoContent))
        .expect(Expectation::BodyIsEmpty),
    ])
}

fn credential_error(
    name: &str,
    path: &str,
    body: serde_json::Value,
    error: &str,
) -> DomainResult<TestCase> {
    Ok(TestCase::post(name, path)
        .with_body(body)
        .expect(Expectation::status(400))
        .expect(Expectation::status_is(StatusClass::BadRequest))
        .expect(Expectation::property_eq(p("error")?, error))
        .expect(Expectation::property_type(p("error")?, JsonKind::String))
        .expect(Expectation::is_object(PropertyPath::root())))
}

fn register() -> DomainResult<Vec<TestCase>> {
    Ok(vec![
        TestCase::post("register: should succeed registering new user", "/api/register")
            .with_body(json!({"email": "rachel.howell@reqres.in", "password": "somepassword123"}))
            .expect(Expectation::status(200))
            .expect(Expectation::status_is(StatusClass::Ok))
            .expect(Expectation::header("Content-Type", "json"))
            .expect(Expectation::property_type(p("id")?, JsonKind::Number))
            .expect(Expectation::property_type(p("token")?, JsonKind::String)),
        credential_error(
            "register: should NOT succeed registering new user - missing password",
            "/api/register",
            json!({"email": "rachel.howell@reqres.in"}),
            "Missing password",
        )?
        .expect(Expectation::IsJson),
        credential_error(
            "register: should NOT succeed registering new user - missing email or username",
            "/api/register",
            json!({"password": "somepassword123"}),
            "Missing email or username",
        )?
        .expect(Expectation::IsJson),
        credential_error(
            "register: should NOT succeed registering undefined user",
            "/api/register",
            json!({"email": "kiki.sumantri@gmail.com", "password": "somepassword123"}),
            "Note: Only defined users succeed registration",
        )?
        .expect(Expectation::IsJson),
    ])
}

fn login() -> DomainResult<Vec<TestCase>> {
    Ok(vec![
        TestCase::post("login: should login successfully using valid credentials", "/api/login")
            .with_body(json!({"email": "tobias.funke@reqres.in", "password": "somepassword666"}))
            .expect(Expectation::status(200))
            .expect(Expectation::status_is(StatusClass::Ok))
            .expect(Expectation::header("Content-Type", "json"))
            .expect(Expectation::property_type(p("token")?, JsonKind::String))
            .expect(Expectation::property_length(p("token")?, 17)),
        credential_error(
            "login: should NOT login using incomplete credentials - missing password",
            "/api/login",
            json!({"email": "tobias.funke@reqres.in"}),
            "Missing password",
        )?,
        credential_error(
            "login: should NOT login using incomplete credentials - missing email or username",
            "/api/login",
            json!({"password": "somepassword666"}),
            "Missing email or username",
        )?,
        credential_error(
            "login: should NOT login using invalid credentials - user not found",
            "/api/login",
            json!({"email": "kiki.sumantri@reqres.in", "password": "somepassword666"}),
            "user not found",
        )?,
    ])
}

fn delayed_users() -> DomainResult<TestCase> {
    Ok(TestCase::get(
        "get user list: should get list of users with some delay times",
        "/api/users",
    )
    .with_query("delay", 5)
    .with_timeout(DELAYED_TIMEOUT)
    .expect(Expectation::status(200))
    .expect(Expectation::status_is(StatusClass::Ok))
    .expect(Expectation::IsJson)
    .expect(Expectation::is_array(p("data")?))
    .expect(Expectation::element_keys(p("data")?, 0, USER_KEYS))
    .expect(Expectation::property_eq(p("data[0].id")?, 1))
    .expect(Expectation::property_type(p("data[0].id")?, JsonKind::Number))
    .expect(Expectation::property_eq(p("data[1].email")?, "janet.weaver@reqres.in"))
    .expect(Expectation::property_eq(p("data[2].first_name")?, "Emma"))
    .expect(Expectation::property_eq(p("data[3].last_name")?, "Holt"))
    .expect(Expectation::property_eq(
        p("data[4].avatar")?,
        "https://reqres.in/img/faces/5-image.jpg",
    )))
}
