/*!
# Colabora API documentation

Every request carries a JSON body. Every endpoint except login and the health
checks reads the API key from the `key` field of that body. A request with a
missing or wrong key ends with `403 Forbidden` and a body like
`{"error": "Access denied: missing API key"}`.

Authorized requests always get `200 OK`. Whether the operation did what was
asked is reported in the `result` field, as a message starting with `ok:` or
`error:`.

## Login

`POST /api/login` with `{"username": ..., "password": ...}`.

- Correct credentials: `{"result": "ok: ingreso correcto", "key": "<api key>"}`
- Wrong credentials: `{"result": "error: ingreso denegado"}`
- A body without both fields: `400 Bad Request` with
  `{"error": "Malformed body: ..."}`

## Initiatives

An initiative is identified by `entidad`, `legislatura` and `numero`. It also
has `tema`, `cambios` and `documento`.

| Method | Path | Body fields | Result |
|---|---|---|---|
| GET | `/api/iniciativa` | `entidad`, `legislatura` | list of initiatives |
| POST | `/api/iniciativa` | `entidad`, `legislatura`, `numero`, `cambios`, `documento`, optional `tema` | `ok: iniciativa N creada` / `error: iniciativa N no creada` |
| PATCH | `/api/iniciativa` | `entidad`, `legislatura`, `numero`, `cambios`, `documento` | `ok: iniciativa N actualizada` / `error: iniciativa N no actualizada` |
| DELETE | `/api/iniciativa` | `entidad`, `legislatura`, `numero` | `ok: iniciativa N removida` / `error: iniciativa N no removida` |

Creating an initiative that already exists, or updating or removing one that
does not, is reported with an `error:` result. Nothing changes in that case.

An authorized request with missing or mistyped fields ends with
`400 Bad Request`.

## Search

`POST /api/buscar` with `{"tema": "..."}` returns an HTML page with a table
of every initiative whose topic contains the given text. An empty `tema`
lists every initiative. Matching is case sensitive unless
`search.case_sensitive` is turned off.

## Health checks

- `GET /__lbheartbeat__` - empty `200 OK`.
- `GET /__heartbeat__` - JSON with the running version.
- `GET /__version__` - the `version.json` of the build.
*/
