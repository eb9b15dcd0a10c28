use diesel::prelude::*;

use crate::schema::company_master;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = company_master)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CompanyMaster {
    pub company_id: i32,
    pub company_code: String,
    pub name: String,
    pub exchange: String,
    pub marker: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = company_master)]
pub struct NewCompanyMaster {
    pub company_code: String,
    pub name: String,
    pub exchange: String,
    pub marker: String,
}
